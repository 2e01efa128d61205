//! Bot runtime - Polling and Webhook runners.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use super::dispatcher::{BotDispatcher, ThrottledBot};
use super::health;
use super::webhook::start_webhook;
use crate::config::{BotMode, Config};

/// Run the bot with the configured mode.
///
/// Both modes keep the health endpoint up on `PORT`.
pub async fn run(
    config: &Config,
    bot: ThrottledBot,
    mut dispatcher: BotDispatcher,
) -> anyhow::Result<()> {
    // Listen on all interfaces at the configured port
    let address = SocketAddr::from(([0, 0, 0, 0], config.port));

    match config.bot_mode {
        BotMode::Polling => {
            info!("Starting bot in polling mode...");

            let tcp = TcpListener::bind(address).await?;
            info!("📡 Health check listening on: {}", address);
            tokio::spawn(async move {
                if let Err(e) = axum::serve(tcp, health::router(true)).await {
                    error!("Health server error: {}", e);
                }
            });

            dispatcher.dispatch().await;
        }
        BotMode::Webhook => {
            info!("Starting bot in webhook mode...");
            start_webhook(config, address, bot, dispatcher).await?;
        }
    }

    Ok(())
}
