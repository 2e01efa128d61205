//! Utility functions.
//!
//! Collection of helper functions used across the bot.

pub mod target;
pub mod text;

pub use target::{get_target, Target};
pub use text::{
    code_list, format_duration, html_escape, mention, non_empty, parse_duration, split_words,
};
