//! MongoDB-backed chat config store.
//!
//! One document per chat in `chat_configs`, upserted by `chat_id`,
//! with a read-through Moka cache in front of it.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, ReplaceOptions};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use super::{ChatConfigStore, StoreError};
use crate::cache::{CacheConfig, TypedCache};
use crate::moderation::ChatConfig;

/// Store for chat configs in MongoDB.
pub struct MongoStore {
    collection: Collection<ChatConfig>,
    cache: TypedCache<i64, ChatConfig>,
}

impl MongoStore {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection or the initial ping fails.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        Ok(Self {
            collection: client.database(db_name).collection("chat_configs"),
            cache: TypedCache::new("chat_configs", CacheConfig::chat_configs()),
        })
    }
}

#[async_trait]
impl ChatConfigStore for MongoStore {
    async fn load(&self, chat_id: i64) -> Result<Option<ChatConfig>, StoreError> {
        if let Some(config) = self.cache.get(&chat_id) {
            return Ok(Some(config));
        }
        debug!("{} cache miss for chat {}", self.cache.name(), chat_id);

        let result = self.collection.find_one(doc! { "chat_id": chat_id }).await?;
        debug!("DB get chat config for {}: {:?}", chat_id, result.is_some());

        if let Some(config) = &result {
            self.cache.insert(chat_id, config.clone());
        }

        Ok(result)
    }

    async fn save(&self, config: &ChatConfig) -> Result<(), StoreError> {
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(doc! { "chat_id": config.chat_id }, config)
            .with_options(options)
            .await?;

        self.cache.insert(config.chat_id, config.clone());
        debug!("Saved chat config for {}", config.chat_id);

        Ok(())
    }
}
