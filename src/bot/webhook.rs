//! Webhook mode implementation for the bot.
//!
//! teloxide registers the webhook with Telegram and hands back an axum
//! router for the update endpoint. The health routes are merged onto the
//! same router so one listener serves both. The webhook is deleted again
//! on shutdown.

use std::net::SocketAddr;

use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use teloxide::update_listeners::UpdateListener;
use tokio::net::TcpListener;
use tracing::{error, info};
use url::Url;

use super::dispatcher::{BotDispatcher, ThrottledBot};
use super::health;
use crate::config::{Config, ConfigError};

/// Start the bot in webhook mode.
pub async fn start_webhook(
    config: &Config,
    address: SocketAddr,
    bot: ThrottledBot,
    mut dispatcher: BotDispatcher,
) -> anyhow::Result<()> {
    let webhook_url = config
        .webhook_url
        .as_deref()
        .ok_or(ConfigError::MissingForWebhook("WEBHOOK_URL"))?;
    let url = Url::parse(webhook_url)?;

    let mut options = Options::new(address, url.clone());
    if let Some(secret) = &config.webhook_secret {
        options = options.secret_token(secret.clone());
        info!("Webhook secret token configured");
    }

    let include_root = url.path() != "/";

    let tcp = TcpListener::bind(address).await?;
    info!("🔗 Setting webhook URL: {}", url);
    info!("📡 Listening on: {}", address);

    // Calls setWebhook; the returned router only handles update POSTs.
    let (mut listener, stop_flag, router) =
        webhooks::axum_to_router(bot.inner().clone(), options).await?;
    let app = router.merge(health::router(include_root));

    let stop_token = listener.stop_token();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp, app).with_graceful_shutdown(stop_flag).await {
            error!("Webhook server error: {}", e);
            stop_token.stop();
        }
    });

    info!("✅ Webhook setup complete, waiting for updates...");

    let error_handler = LoggingErrorHandler::with_custom_text("Error from update listener");
    dispatcher
        .dispatch_with_listener(listener, error_handler)
        .await;

    Ok(())
}
