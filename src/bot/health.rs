//! Liveness endpoint served next to the bot.

use axum::routing::get;
use axum::Router;

/// Body returned by the liveness routes.
pub const HEALTH_TEXT: &str = "✅ Bot is running fine!";

/// Health routes. `/` is left out when the webhook itself lives there.
pub fn router(include_root: bool) -> Router {
    let router = Router::new().route("/health", get(health));
    if include_root {
        router.route("/", get(health))
    } else {
        router
    }
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body() {
        assert_eq!(health().await, "✅ Bot is running fine!");
    }
}
