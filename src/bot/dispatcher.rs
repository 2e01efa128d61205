//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command handlers and event handlers.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::{DefaultKey, UpdateHandler};
use teloxide::prelude::*;

use crate::config::Config;
use crate::events;
use crate::permissions::Permissions;
use crate::plugins;
use crate::store::{ChatConfigStore, ChatStates, RateLimiter};

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Dispatcher type used by the runtime.
pub type BotDispatcher = Dispatcher<ThrottledBot, anyhow::Error, DefaultKey>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Per-chat config and user state.
    pub chats: Arc<ChatStates>,

    /// Flood control and per-admin action limits.
    pub rate_limiter: Arc<RateLimiter>,

    /// Permission checker with admin caching.
    pub permissions: Permissions,

    /// Warnings before an automatic ban.
    pub warn_limit: u32,
}

impl AppState {
    /// Create a new application state.
    pub fn new(bot: &ThrottledBot, store: Arc<dyn ChatConfigStore>, config: &Config) -> Self {
        // Permission lookups bypass the throttle queue.
        let permissions = Permissions::new(
            bot.inner().clone(),
            config.admin_ids.clone(),
            config.admin_policy,
        );

        Self {
            chats: Arc::new(ChatStates::new(store, config.default_ban_words.clone())),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limits)),
            permissions,
            warn_limit: config.warn_limit,
        }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(bot: ThrottledBot, state: AppState) -> BotDispatcher {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    // Commands first, then service messages and moderation
    let message_handler = Update::filter_message()
        .branch(plugins::command_handler())
        .branch(events::message_event_handler());

    // Chat member updates (leave/kick cleanup)
    let member_handler = Update::filter_chat_member().branch(events::member_event_handler());

    dptree::entry()
        .branch(message_handler)
        .branch(member_handler)
}
