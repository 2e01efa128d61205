//! Bot module - dispatcher, runtime and HTTP surface.

pub mod dispatcher;
mod health;
mod runtime;
mod webhook;

pub use dispatcher::{build_dispatcher, AppState};
pub use runtime::run;
