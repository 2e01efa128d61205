//! Moderation core.
//!
//! Pure, synchronous state machine for one chat:
//!
//! - `ChatConfig` - rules text and ban words
//! - `UserState` - warnings and recent message history per user
//! - `RateLimitWindow` - sliding-window admission control
//! - `evaluate_message` - ban-word decision for an incoming message
//!
//! Nothing here performs I/O. Callers load state, run an operation,
//! and persist the result themselves.

mod chat_config;
mod engine;
mod rate_limit;
mod user_state;

pub use chat_config::{
    normalize_ban_word, BanWordsAdded, BanWordsRemoved, ChatConfig, DEFAULT_RULES_TEXT,
};
pub use engine::{contains_whole_word, evaluate_message, find_ban_word, Decision};
pub use rate_limit::{check_rate_limit, ActionKind, RateLimit, RateLimitWindow};
pub use user_state::{
    MessageHistory, UserState, UserWarningState, Warning, WarningOutcome, HISTORY_CAPACITY,
    WARNING_LIMIT,
};
