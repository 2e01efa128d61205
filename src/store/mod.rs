//! State and storage layer.
//!
//! - `ChatConfigStore` - load/save contract with memory and MongoDB backends
//! - `ChatStates` - per-chat locking and per-user transient state
//! - `RateLimiter` - sliding windows per user and action

mod backend;
mod chat_states;
mod mongo;
mod rate_limiter;

pub use backend::{ChatConfigStore, MemoryStore, StoreError};
pub use chat_states::{ChatGuard, ChatStates, RecordedWarning};
pub use mongo::MongoStore;
pub use rate_limiter::RateLimiter;
