//! Cache sizing and expiry presets.

use std::time::Duration;

/// Capacity and expiry of one cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub max_capacity: u64,
    /// Entries expire this long after insertion.
    pub ttl: Option<Duration>,
    /// Entries expire this long after the last read.
    pub tti: Option<Duration>,
}

impl CacheConfig {
    /// Bounded cache without expiry.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ttl: None,
            tti: None,
        }
    }

    #[must_use]
    pub fn ttl(self, ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..self
        }
    }

    #[must_use]
    pub fn tti(self, tti: Duration) -> Self {
        Self {
            tti: Some(tti),
            ..self
        }
    }

    /// Admin status: short-lived, promotions should show up quickly.
    pub fn admin_lookups() -> Self {
        Self::with_capacity(10_000)
            .ttl(Duration::from_secs(300))
            .tti(Duration::from_secs(120))
    }

    /// Chat configs: read on every group message, written by admin commands.
    pub fn chat_configs() -> Self {
        Self::with_capacity(5_000).ttl(Duration::from_secs(600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let admins = CacheConfig::admin_lookups();
        assert_eq!(admins.ttl, Some(Duration::from_secs(300)));
        assert_eq!(admins.tti, Some(Duration::from_secs(120)));

        let configs = CacheConfig::chat_configs();
        assert_eq!(configs.max_capacity, 5_000);
        assert_eq!(configs.tti, None);
    }
}
