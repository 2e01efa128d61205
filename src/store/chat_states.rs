//! Per-chat state store.
//!
//! Every chat gets its own async mutex. Holding a [`ChatGuard`] gives
//! exclusive access to that chat's config and per-user state, so
//! load → mutate → save sequences never interleave within a chat while
//! different chats proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::{ChatConfigStore, StoreError};
use crate::moderation::{evaluate_message, ChatConfig, Decision, UserState, WarningOutcome};

/// Transient per-user state of one chat.
#[derive(Debug, Default)]
struct ChatSlot {
    users: HashMap<u64, UserState>,
}

/// Registry of per-chat state.
pub struct ChatStates {
    store: Arc<dyn ChatConfigStore>,
    default_ban_words: Vec<String>,
    chats: DashMap<i64, Arc<Mutex<ChatSlot>>>,
}

impl ChatStates {
    /// New chats are seeded with `default_ban_words`.
    pub fn new(store: Arc<dyn ChatConfigStore>, default_ban_words: Vec<String>) -> Self {
        Self {
            store,
            default_ban_words,
            chats: DashMap::new(),
        }
    }

    fn slot(&self, chat_id: i64) -> Arc<Mutex<ChatSlot>> {
        self.chats.entry(chat_id).or_default().clone()
    }

    /// Lock a chat, loading (or lazily creating) its config.
    pub async fn lock(&self, chat_id: i64) -> Result<ChatGuard, StoreError> {
        let slot = self.slot(chat_id).lock_owned().await;

        let config = match self.store.load(chat_id).await? {
            Some(config) => config,
            None => {
                let config = ChatConfig::with_ban_words(chat_id, &self.default_ban_words);
                self.store.save(&config).await?;
                info!("Initialized config for chat {}", chat_id);
                config
            }
        };

        Ok(ChatGuard {
            config,
            slot,
            store: Arc::clone(&self.store),
        })
    }

    /// Drop all state of a user who left the chat.
    ///
    /// Returns `true` if anything was tracked for them.
    pub async fn forget_user(&self, chat_id: i64, user_id: u64) -> bool {
        let Some(slot) = self.chats.get(&chat_id).map(|s| Arc::clone(s.value())) else {
            return false;
        };

        let removed = slot.lock().await.users.remove(&user_id).is_some();
        if removed {
            debug!("Cleared state of user {} in chat {}", user_id, chat_id);
        }
        removed
    }
}

/// A warning just recorded, with what is needed to act on it after the
/// chat is unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWarning {
    pub outcome: WarningOutcome,
    /// Recent message ids of the user, filled only when the limit is reached.
    pub history: Vec<i32>,
}

/// Exclusive handle on one chat's state.
pub struct ChatGuard {
    config: ChatConfig,
    slot: OwnedMutexGuard<ChatSlot>,
    store: Arc<dyn ChatConfigStore>,
}

impl ChatGuard {
    pub fn chat_id(&self) -> i64 {
        self.config.chat_id
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Mutable config. Call [`ChatGuard::persist`] afterwards.
    pub fn config_mut(&mut self) -> &mut ChatConfig {
        &mut self.config
    }

    /// State of a user, created on first access.
    pub fn user(&mut self, user_id: u64) -> &mut UserState {
        self.slot.users.entry(user_id).or_default()
    }

    /// State of a user, if any is tracked.
    pub fn peek_user(&self, user_id: u64) -> Option<&UserState> {
        self.slot.users.get(&user_id)
    }

    /// Evaluate a message from `user_id` against this chat's ban words.
    pub fn evaluate(&mut self, user_id: u64, text: &str, message_id: i32) -> Decision {
        let user = self.slot.users.entry(user_id).or_default();
        evaluate_message(&self.config, user, text, message_id)
    }

    /// Record a warning for a user.
    ///
    /// The user's state stays in place; callers forget them only once the
    /// ban went through.
    pub fn warn(&mut self, user_id: u64, reason: Option<String>, limit: u32) -> RecordedWarning {
        let user = self.user(user_id);
        let outcome = user.record_warning(reason, limit);
        let history = if outcome.limit_reached {
            user.history.ids().collect()
        } else {
            Vec::new()
        };
        RecordedWarning { outcome, history }
    }

    /// Reset a user's warnings. Returns the count that was cleared.
    pub fn clear_warnings(&mut self, user_id: u64) -> u32 {
        let Some(user) = self.slot.users.get_mut(&user_id) else {
            return 0;
        };

        let cleared = user.warning_count();
        user.clear_warnings();
        if user.is_empty() {
            self.slot.users.remove(&user_id);
        }
        cleared
    }

    /// Drop everything tracked for a user.
    pub fn forget_user(&mut self, user_id: u64) -> Option<UserState> {
        self.slot.users.remove(&user_id)
    }

    /// Save the (possibly mutated) config.
    pub async fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::WARNING_LIMIT;
    use crate::store::MemoryStore;

    fn states(defaults: &[&str]) -> (Arc<MemoryStore>, ChatStates) {
        let store = Arc::new(MemoryStore::new());
        let states = ChatStates::new(
            store.clone(),
            defaults.iter().map(|w| w.to_string()).collect(),
        );
        (store, states)
    }

    #[tokio::test]
    async fn test_lazy_init_seeds_and_saves() {
        let (store, states) = states(&["porn", "sex"]);

        let guard = states.lock(-1).await.unwrap();
        assert_eq!(guard.chat_id(), -1);
        assert_eq!(guard.config().ban_words(), ["porn", "sex"]);
        drop(guard);

        let saved = store.load(-1).await.unwrap().unwrap();
        assert_eq!(saved.ban_words(), ["porn", "sex"]);
    }

    #[tokio::test]
    async fn test_persist_survives_relock() {
        let (_, states) = states(&[]);

        {
            let mut guard = states.lock(1).await.unwrap();
            guard.config_mut().add_ban_words(["spam"]);
            guard.config_mut().set_rules("be nice");
            guard.persist().await.unwrap();
        }

        let guard = states.lock(1).await.unwrap();
        assert_eq!(guard.config().ban_words(), ["spam"]);
        assert_eq!(guard.config().rules_text, "be nice");
    }

    #[tokio::test]
    async fn test_unpersisted_config_changes_are_dropped() {
        let (_, states) = states(&[]);

        {
            let mut guard = states.lock(1).await.unwrap();
            guard.config_mut().add_ban_words(["spam"]);
        }

        let guard = states.lock(1).await.unwrap();
        assert!(guard.config().ban_words().is_empty());
    }

    #[tokio::test]
    async fn test_chats_are_isolated() {
        let (_, states) = states(&[]);

        {
            let mut guard = states.lock(1).await.unwrap();
            guard.config_mut().add_ban_words(["spam"]);
            guard.persist().await.unwrap();
            guard.user(42).record_warning(None, WARNING_LIMIT);
        }

        let mut other = states.lock(2).await.unwrap();
        assert!(other.config().ban_words().is_empty());
        assert!(other.peek_user(42).is_none());
        assert_eq!(other.evaluate(42, "spam", 1), Decision::Allow);
    }

    #[tokio::test]
    async fn test_warnings_survive_between_locks_and_clear() {
        let (_, states) = states(&["spam"]);

        for _ in 0..2 {
            let mut guard = states.lock(1).await.unwrap();
            assert!(guard.evaluate(7, "spam!", 1).is_violation());
            guard.user(7).record_warning(Some("spam".into()), WARNING_LIMIT);
        }

        let mut guard = states.lock(1).await.unwrap();
        assert_eq!(guard.peek_user(7).unwrap().warning_count(), 2);
        assert_eq!(guard.clear_warnings(7), 2);
        assert!(guard.peek_user(7).is_none());
        assert_eq!(guard.clear_warnings(7), 0);
    }

    #[tokio::test]
    async fn test_warn_snapshots_history_at_limit() {
        let (_, states) = states(&["spam"]);

        {
            let mut guard = states.lock(1).await.unwrap();
            guard.evaluate(7, "hello", 100);
            guard.evaluate(7, "world", 101);

            let first = guard.warn(7, Some("spam".into()), 2);
            assert_eq!(first.outcome.count, 1);
            assert!(!first.outcome.limit_reached);
            assert!(first.history.is_empty());

            let second = guard.warn(7, None, 2);
            assert!(second.outcome.limit_reached);
            assert_eq!(second.history, vec![100, 101]);
        }

        // The guard is gone; state is kept until the caller forgets the user.
        let guard = states.lock(1).await.unwrap();
        let user = guard.peek_user(7).unwrap();
        assert_eq!(user.warning_count(), 2);
        assert_eq!(user.history.len(), 2);
        drop(guard);

        assert!(states.forget_user(1, 7).await);
    }

    #[tokio::test]
    async fn test_forget_user_on_leave() {
        let (_, states) = states(&[]);

        assert!(!states.forget_user(1, 7).await);

        {
            let mut guard = states.lock(1).await.unwrap();
            guard.evaluate(7, "hello", 100);
        }

        assert!(states.forget_user(1, 7).await);
        assert!(!states.forget_user(1, 7).await);

        let guard = states.lock(1).await.unwrap();
        assert!(guard.peek_user(7).is_none());
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_per_chat() {
        let (_, states) = states(&[]);
        let states = Arc::new(states);

        let guard = states.lock(1).await.unwrap();

        // A different chat is not blocked.
        let other = states.lock(2).await.unwrap();
        drop(other);

        let contender = {
            let states = Arc::clone(&states);
            tokio::spawn(async move { states.lock(1).await.map(|g| g.chat_id()) })
        };

        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        assert_eq!(contender.await.unwrap().unwrap(), 1);
    }
}
