//! Permission system for moderation commands.
//!
//! Every mutating command goes through [`Permissions::is_admin`], the one
//! place where the admin policy is applied.
//!
//! ## Features
//!
//! - Chat admin lookups cached for 5 minutes (reduces API hits)
//! - Fixed allow-list from `ADMIN_IDS`
//! - Configurable policy (`ADMIN_POLICY`)

mod checker;

pub use checker::Permissions;
