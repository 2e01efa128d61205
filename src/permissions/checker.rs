//! Admin checks with caching.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMember, ChatMemberKind, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, TypedCache};
use crate::config::AdminPolicy;

/// Cache key for admin lookups.
type AdminCacheKey = (i64, u64); // (chat_id, user_id)

/// Whether a chat member is the creator or an administrator.
fn is_chat_admin_member(member: &ChatMember) -> bool {
    matches!(
        member.kind,
        ChatMemberKind::Owner(_) | ChatMemberKind::Administrator(_)
    )
}

/// Apply the policy to what is known about a user.
fn grants(policy: AdminPolicy, allowlisted: bool, chat_admin: bool) -> bool {
    match policy {
        AdminPolicy::Chat => chat_admin,
        AdminPolicy::Allowlist => allowlisted,
        AdminPolicy::Both => allowlisted || chat_admin,
    }
}

/// Single authorization point for moderation commands.
///
/// Whether chat admins, the `ADMIN_IDS` allow-list, or both count as
/// admins is decided by [`AdminPolicy`].
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: TypedCache<AdminCacheKey, bool>,
    admin_ids: Arc<[u64]>,
    policy: AdminPolicy,
}

impl Permissions {
    pub fn new(bot: Bot, admin_ids: Vec<u64>, policy: AdminPolicy) -> Self {
        Self {
            bot,
            cache: TypedCache::new("admin_permissions", CacheConfig::admin_lookups()),
            admin_ids: admin_ids.into(),
            policy,
        }
    }

    /// Check if a user is on the fixed allow-list.
    #[inline]
    pub fn is_allowlisted(&self, user_id: UserId) -> bool {
        self.admin_ids.contains(&user_id.0)
    }

    /// Check if a user may run moderation commands in a chat.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        let allowlisted = self.is_allowlisted(user_id);

        // Skip the API round trip when the answer is already known.
        let chat_admin = match self.policy {
            AdminPolicy::Allowlist => false,
            AdminPolicy::Both if allowlisted => false,
            _ => self.is_chat_admin(chat_id, user_id).await?,
        };

        Ok(grants(self.policy, allowlisted, chat_admin))
    }

    /// Check chat admin status via the Telegram API (cached).
    async fn is_chat_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        let cache_key = (chat_id.0, user_id.0);

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Admin cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        debug!("Admin cache miss for user {} in chat {}", user_id, chat_id);

        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let is_admin = is_chat_admin_member(&member);

        // Cache the result (including false for non-admins)
        self.cache.insert(cache_key, is_admin);

        Ok(is_admin)
    }

    /// Invalidate cached admin info for a user.
    ///
    /// Call this when admin status might have changed.
    pub fn invalidate(&self, chat_id: ChatId, user_id: UserId) {
        self.cache.invalidate(&(chat_id.0, user_id.0));
        debug!(
            "Invalidated admin cache for user {} in chat {}",
            user_id, chat_id
        );
    }
}
