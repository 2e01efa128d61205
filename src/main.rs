//! Warden - Telegram group moderation bot
//!
//! Deletes messages containing banned words, warns the sender, bans
//! repeat offenders and greets new members with the group rules.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `moderation` - Pure moderation state machine
//! - `store` - Chat config persistence, per-chat state, rate limiting
//! - `cache` - Moka-backed caches
//! - `permissions` - Admin checking with caching
//! - `bot` - Dispatcher, runtime and health endpoint (with Throttle for API rate limiting)
//! - `plugins` - Command handlers
//! - `events` - Message and membership event handlers
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod events;
mod moderation;
mod permissions;
mod plugins;
mod store;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

use config::Config;
use store::{ChatConfigStore, MemoryStore, MongoStore};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warden=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Warden bot...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    let store: Arc<dyn ChatConfigStore> = match &config.mongodb_uri {
        Some(uri) => {
            info!("Connecting to MongoDB...");
            Arc::new(MongoStore::connect(uri, &config.mongodb_database).await?)
        }
        None => {
            info!("MONGODB_URI not set, chat configs are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    // Throttle respects Telegram's limits (30 msg/s globally, 20/min per group)
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if config.admin_ids.is_empty() {
        info!("No fixed admins configured (ADMIN_IDS is empty)");
    } else {
        info!("Fixed admins: {:?}", config.admin_ids);
    }
    info!("Admin policy: {:?}", config.admin_policy);

    let state = bot::AppState::new(&bot, store, &config);
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    bot::run(&config, bot, dispatcher).await
}
