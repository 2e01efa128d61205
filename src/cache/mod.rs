//! Cache module - small typed wrapper over Moka.
//!
//! Used for read-through caching of chat configs (MongoDB backend)
//! and of admin lookups against the Telegram API.

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;
