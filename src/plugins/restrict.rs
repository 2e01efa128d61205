//! Member restriction commands.
//!
//! Commands (reply to the target's message):
//! - /ban [reason]
//! - /kick [reason] - ban + unban, the user may rejoin
//! - /mute [duration] - no permissions, optionally until a time
//! - /unmute

use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::{ChatPermissions, ParseMode, ReplyParameters, UserId};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::ActionKind;
use crate::utils::{format_duration, get_target, html_escape, mention, non_empty, parse_duration, Target};

/// Permissions restored by /unmute.
fn member_permissions() -> ChatPermissions {
    ChatPermissions::SEND_MESSAGES
        | ChatPermissions::SEND_AUDIOS
        | ChatPermissions::SEND_DOCUMENTS
        | ChatPermissions::SEND_PHOTOS
        | ChatPermissions::SEND_VIDEOS
        | ChatPermissions::SEND_VIDEO_NOTES
        | ChatPermissions::SEND_VOICE_NOTES
        | ChatPermissions::SEND_POLLS
        | ChatPermissions::SEND_OTHER_MESSAGES
        | ChatPermissions::ADD_WEB_PAGE_PREVIEWS
        | ChatPermissions::INVITE_USERS
}

/// Handle /ban command.
pub async fn ban_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    reason: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(target) = resolve_target(&bot, &msg, &state, "ban").await? else {
        return Ok(());
    };
    if !check_ban_limit(&bot, &msg, &state).await? {
        return Ok(());
    }

    if let Err(e) = bot.ban_chat_member(chat_id, target.id).await {
        warn!("Failed to ban user {} in chat {}: {}", target.id, chat_id, e);
        return reply_failure(&bot, &msg, "ban", &target).await;
    }

    state.chats.forget_user(chat_id.0, target.id.0).await;
    info!("User {} banned in chat {}", target.id, chat_id);

    bot.send_message(
        chat_id,
        format!("🔨 {} banned.{}", mention(target.id, &target.name), reason_line(&reason)),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Handle /kick command.
pub async fn kick_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    reason: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(target) = resolve_target(&bot, &msg, &state, "kick").await? else {
        return Ok(());
    };
    if !check_ban_limit(&bot, &msg, &state).await? {
        return Ok(());
    }

    if let Err(e) = bot.ban_chat_member(chat_id, target.id).await {
        warn!("Failed to kick user {} in chat {}: {}", target.id, chat_id, e);
        return reply_failure(&bot, &msg, "kick", &target).await;
    }
    if let Err(e) = bot.unban_chat_member(chat_id, target.id).only_if_banned(true).await {
        warn!("Failed to unban kicked user {} in chat {}: {}", target.id, chat_id, e);
    }

    state.chats.forget_user(chat_id.0, target.id.0).await;
    info!("User {} kicked from chat {}", target.id, chat_id);

    bot.send_message(
        chat_id,
        format!("👢 {} kicked.{}", mention(target.id, &target.name), reason_line(&reason)),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Handle /mute command.
pub async fn mute_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    duration: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    // (duration, until) for a timed mute
    let timed = match non_empty(&duration) {
        Some(arg) => match parse_duration(arg).and_then(|d| Some((d, mute_until(d, Utc::now())?))) {
            Some(timed) => Some(timed),
            None => {
                bot.send_message(chat_id, "Usage: /mute [duration]\nExamples: 30m, 2h, 1d, 1w")
                    .reply_parameters(ReplyParameters::new(msg.id))
                    .await?;
                return Ok(());
            }
        },
        None => None,
    };

    let Some(target) = resolve_target(&bot, &msg, &state, "mute").await? else {
        return Ok(());
    };

    let request = bot.restrict_chat_member(chat_id, target.id, ChatPermissions::empty());
    let request = match timed {
        Some((_, until)) => request.until_date(until),
        None => request,
    };

    if let Err(e) = request.await {
        warn!("Failed to mute user {} in chat {}: {}", target.id, chat_id, e);
        return reply_failure(&bot, &msg, "mute", &target).await;
    }

    info!("User {} muted in chat {}", target.id, chat_id);

    let until = timed
        .map(|(d, _)| format!(" for {}", format_duration(d.as_secs())))
        .unwrap_or_default();

    bot.send_message(
        chat_id,
        format!("🔇 {} muted{}.", mention(target.id, &target.name), until),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Handle /unmute command.
pub async fn unmute_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let Some(target) = resolve_target(&bot, &msg, &state, "unmute").await? else {
        return Ok(());
    };

    if let Err(e) = bot
        .restrict_chat_member(chat_id, target.id, member_permissions())
        .await
    {
        warn!("Failed to unmute user {} in chat {}: {}", target.id, chat_id, e);
        return reply_failure(&bot, &msg, "unmute", &target).await;
    }

    info!("User {} unmuted in chat {}", target.id, chat_id);

    bot.send_message(chat_id, format!("🔊 {} unmuted.", mention(target.id, &target.name)))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Resolve the replied-to user, refusing admins and the sender.
///
/// Replies with the reason and returns `None` when there is no valid target.
async fn resolve_target(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
    action: &str,
) -> anyhow::Result<Option<Target>> {
    let chat_id = msg.chat.id;
    let sender = msg.from.as_ref().map(|u| u.id).unwrap_or(UserId(0));

    let refusal = match get_target(msg) {
        None => format!("❌ Reply to a user's message to {} them.", action),
        Some(target) if target.id == sender => format!("❌ You can't {} yourself.", action),
        Some(target) => {
            if state.permissions.is_admin(chat_id, target.id).await.unwrap_or(false) {
                format!("❌ Admins can't be targeted by /{}.", action)
            } else {
                return Ok(Some(target));
            }
        }
    };

    bot.send_message(chat_id, refusal)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(None)
}

/// Apply the issuing admin's `ban` rate limit.
async fn check_ban_limit(bot: &ThrottledBot, msg: &Message, state: &AppState) -> anyhow::Result<bool> {
    let admin_id = msg.from.as_ref().map(|u| u.id).unwrap_or(UserId(0));
    if state.rate_limiter.check(admin_id.0, ActionKind::Ban) {
        return Ok(true);
    }

    bot.send_message(msg.chat.id, "⏳ Too many bans. Try again later.")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(false)
}

async fn reply_failure(
    bot: &ThrottledBot,
    msg: &Message,
    action: &str,
    target: &Target,
) -> anyhow::Result<()> {
    bot.send_message(
        msg.chat.id,
        format!(
            "❌ Failed to {} {}. Make sure I'm an admin with the right permissions.",
            action,
            mention(target.id, &target.name)
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_parameters(ReplyParameters::new(msg.id))
    .await?;
    Ok(())
}

/// End of a timed mute, `None` if it is not representable.
fn mute_until(duration: Duration, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let delta = chrono::Duration::from_std(duration).ok()?;
    now.checked_add_signed(delta)
}

fn reason_line(reason: &str) -> String {
    non_empty(reason)
        .map(|r| format!("\nReason: {}", html_escape(r)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_line() {
        assert_eq!(reason_line("   "), "");
        assert_eq!(reason_line(" spam & scams "), "\nReason: spam &amp; scams");
    }

    #[test]
    fn test_mute_until() {
        let now = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(
            mute_until(Duration::from_secs(3600), now),
            DateTime::from_timestamp(3600, 0)
        );
        assert_eq!(mute_until(Duration::from_secs(u64::MAX), now), None);
        assert_eq!(mute_until(parse_duration("1000000000000w").unwrap(), now), None);
    }

    #[test]
    fn test_unmute_restores_messaging() {
        let perms = member_permissions();
        assert!(perms.contains(ChatPermissions::SEND_MESSAGES));
        assert!(perms.contains(ChatPermissions::SEND_PHOTOS));
        assert!(!perms.contains(ChatPermissions::PIN_MESSAGES));
        assert!(ChatPermissions::empty().is_empty());
    }
}
