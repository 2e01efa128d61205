//! Configuration module for the Warden bot.
//!
//! Loads configuration from environment variables (a `.env` file is
//! honoured).

use std::env;

use thiserror::Error;

use crate::moderation::{ActionKind, RateLimit, WARNING_LIMIT};

/// Bot running mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Who counts as an admin for moderation commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminPolicy {
    /// Telegram chat creator and administrators
    Chat,
    /// Only users listed in `ADMIN_IDS`
    Allowlist,
    /// Either of the above
    #[default]
    Both,
}

impl AdminPolicy {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Some(Self::Chat),
            "allowlist" => Some(Self::Allowlist),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must be set when BOT_MODE is webhook")]
    MissingForWebhook(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Rate limits per action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub message: RateLimit,
    pub warn: RateLimit,
    pub ban: RateLimit,
}

impl RateLimits {
    pub fn for_kind(&self, kind: ActionKind) -> RateLimit {
        match kind {
            ActionKind::Message => self.message,
            ActionKind::Warn => self.warn,
            ActionKind::Ban => self.ban,
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            message: RateLimit::new(5, 5),
            warn: RateLimit::new(5, 60),
            ban: RateLimit::new(3, 60),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,

    /// Port for the HTTP listener (health check, and webhook in webhook mode)
    pub port: u16,

    /// Fixed admin allow-list (comma-separated `ADMIN_IDS`)
    pub admin_ids: Vec<u64>,
    pub admin_policy: AdminPolicy,

    // Moderation
    pub warn_limit: u32,
    pub default_ban_words: Vec<String>,
    pub rate_limits: RateLimits,

    // MongoDB (in-memory storage when unset)
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let bot_mode = match var("BOT_MODE").map(|m| m.to_lowercase()).as_deref() {
            Some("webhook") => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = var("WEBHOOK_URL");
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::MissingForWebhook("WEBHOOK_URL"));
        }

        let admin_ids = var("ADMIN_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .collect();

        let admin_policy = match var("ADMIN_POLICY") {
            Some(value) => AdminPolicy::parse(&value).ok_or(ConfigError::Invalid {
                key: "ADMIN_POLICY",
                value,
            })?,
            None => AdminPolicy::default(),
        };

        let default_ban_words = var("DEFAULT_BAN_WORDS")
            .unwrap_or_default()
            .split(',')
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let defaults = RateLimits::default();
        let rate_limits = RateLimits {
            message: rate_limit(
                &var,
                "MESSAGE_RATE_LIMIT",
                "MESSAGE_RATE_WINDOW_SECS",
                defaults.message,
            )?,
            warn: rate_limit(&var, "WARN_RATE_LIMIT", "WARN_RATE_WINDOW_SECS", defaults.warn)?,
            ban: rate_limit(&var, "BAN_RATE_LIMIT", "BAN_RATE_WINDOW_SECS", defaults.ban)?,
        };

        Ok(Self {
            bot_token,
            bot_mode,
            webhook_url,
            webhook_secret: var("WEBHOOK_SECRET"),
            port: parse_or(&var, "PORT", 8080)?,
            admin_ids,
            admin_policy,
            warn_limit: parse_or(&var, "WARN_LIMIT", WARNING_LIMIT)?,
            default_ban_words,
            rate_limits,
            mongodb_uri: var("MONGODB_URI"),
            mongodb_database: var("MONGODB_DATABASE").unwrap_or_else(|| "warden".to_string()),
        })
    }
}

fn parse_or<F, T>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Read a limit/window pair, falling back to `default` per key.
fn rate_limit<F>(
    var: &F,
    limit_key: &'static str,
    window_key: &'static str,
    default: RateLimit,
) -> Result<RateLimit, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let limit = parse_or(var, limit_key, default.limit)?;
    let window_secs = parse_or(var, window_key, default.window.as_secs())?;
    Ok(RateLimit::new(limit, window_secs))
}
