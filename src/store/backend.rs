//! Chat config persistence.
//!
//! Storage is behind [`ChatConfigStore`] so the bot runs with MongoDB in
//! production and with the in-memory store when no database is configured.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::moderation::ChatConfig;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

/// Load/save contract for per-chat configuration.
#[async_trait]
pub trait ChatConfigStore: Send + Sync {
    /// Load a chat's config, `None` if the chat was never seen.
    async fn load(&self, chat_id: i64) -> Result<Option<ChatConfig>, StoreError>;

    /// Save (upsert) a chat's config.
    async fn save(&self, config: &ChatConfig) -> Result<(), StoreError>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    configs: DashMap<i64, ChatConfig>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatConfigStore for MemoryStore {
    async fn load(&self, chat_id: i64) -> Result<Option<ChatConfig>, StoreError> {
        Ok(self.configs.get(&chat_id).map(|c| c.clone()))
    }

    async fn save(&self, config: &ChatConfig) -> Result<(), StoreError> {
        self.configs.insert(config.chat_id, config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load(1).await.unwrap().is_none());

        let mut config = ChatConfig::new(1);
        config.add_ban_words(["spam"]);
        store.save(&config).await.unwrap();

        assert_eq!(store.load(1).await.unwrap(), Some(config));
        assert!(store.load(2).await.unwrap().is_none());
    }
}
