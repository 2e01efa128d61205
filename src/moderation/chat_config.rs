//! Per-chat moderation configuration.
//!
//! Holds the rules text and the ban-word list of a single chat.

use serde::{Deserialize, Serialize};

/// Rules shown to new members until an admin runs `/setrules`.
pub const DEFAULT_RULES_TEXT: &str = "👋 Welcome to the group!\n\n\
    Rules:\n\
    1. No spam\n\
    2. Be respectful\n\
    3. No NSFW content";

/// Moderation configuration for one chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// Telegram chat ID (indexed)
    pub chat_id: i64,

    /// Rules text, shown by /rules and in welcome messages
    #[serde(default = "default_rules_text")]
    pub rules_text: String,

    /// Normalized ban words, unique, in insertion order
    #[serde(default)]
    ban_words: Vec<String>,
}

fn default_rules_text() -> String {
    DEFAULT_RULES_TEXT.to_string()
}

/// Result of [`ChatConfig::add_ban_words`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanWordsAdded {
    pub added: Vec<String>,
    pub already_present: Vec<String>,
}

/// Result of [`ChatConfig::remove_ban_words`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanWordsRemoved {
    pub removed: Vec<String>,
    pub not_found: Vec<String>,
}

/// Normalize a ban word: trimmed and lower-cased.
///
/// Returns `None` for empty or whitespace-only input.
pub fn normalize_ban_word(word: &str) -> Option<String> {
    let word = word.trim();
    if word.is_empty() {
        None
    } else {
        Some(word.to_lowercase())
    }
}

impl ChatConfig {
    /// Create a config with the default rules and no ban words.
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            rules_text: default_rules_text(),
            ban_words: Vec::new(),
        }
    }

    /// Create a config seeded with an initial ban-word list.
    pub fn with_ban_words<I, S>(chat_id: i64, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::new(chat_id);
        config.add_ban_words(words);
        config
    }

    /// Ban words in insertion order.
    pub fn ban_words(&self) -> &[String] {
        &self.ban_words
    }

    /// Check whether a (normalized) word is banned.
    pub fn is_banned_word(&self, word: &str) -> bool {
        self.ban_words.iter().any(|w| w == word)
    }

    /// Add ban words.
    ///
    /// Input is normalized and empties are dropped. Both output lists keep
    /// input order; a word repeated within one call is added once and then
    /// reported as already present.
    pub fn add_ban_words<I, S>(&mut self, words: I) -> BanWordsAdded
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = BanWordsAdded::default();

        for word in words.into_iter().filter_map(|w| normalize_ban_word(w.as_ref())) {
            if self.is_banned_word(&word) {
                result.already_present.push(word);
            } else {
                self.ban_words.push(word.clone());
                result.added.push(word);
            }
        }

        result
    }

    /// Remove ban words. Same normalization and ordering as adding.
    pub fn remove_ban_words<I, S>(&mut self, words: I) -> BanWordsRemoved
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut result = BanWordsRemoved::default();

        for word in words.into_iter().filter_map(|w| normalize_ban_word(w.as_ref())) {
            if let Some(pos) = self.ban_words.iter().position(|w| *w == word) {
                self.ban_words.remove(pos);
                result.removed.push(word);
            } else {
                result.not_found.push(word);
            }
        }

        result
    }

    /// Replace the rules text.
    pub fn set_rules(&mut self, text: impl Into<String>) {
        self.rules_text = text.into();
    }
}
