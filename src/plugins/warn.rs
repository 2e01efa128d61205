//! Warning command handlers.
//!
//! Commands:
//! - /warn [reason] - Warn the replied-to user (bans at the limit)
//! - /warns - Show warnings of the replied-to user, or your own
//! - /clearwarnings - Reset the replied-to user's warnings

use chrono::DateTime;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters, UserId};
use tracing::info;

use super::is_group;
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::events::moderation::ban_for_warnings;
use crate::moderation::{ActionKind, Warning};
use crate::utils::{get_target, html_escape, mention, non_empty};

/// Handle /warn command.
pub async fn warn_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    reason: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let admin_id = msg.from.as_ref().map(|u| u.id).unwrap_or(UserId(0));

    let Some(target) = get_target(&msg) else {
        bot.send_message(chat_id, "❌ Reply to a user's message to warn them.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    if target.is_bot {
        bot.send_message(chat_id, "❌ Bots can't be warned.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    if state.permissions.is_admin(chat_id, target.id).await.unwrap_or(false) {
        bot.send_message(chat_id, "❌ Admins can't be warned.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    if !state.rate_limiter.check(admin_id.0, ActionKind::Warn) {
        bot.send_message(chat_id, "⏳ You are warning too fast. Try again later.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let reason = non_empty(&reason).map(str::to_string);

    let warning = state
        .chats
        .lock(chat_id.0)
        .await?
        .warn(target.id.0, reason.clone(), state.warn_limit);
    let outcome = warning.outcome;

    info!(
        "User {} warned in chat {} by {} ({}/{})",
        target.id, chat_id, admin_id, outcome.count, outcome.limit
    );

    if outcome.limit_reached {
        return ban_for_warnings(&bot, &state.chats, chat_id, target.id, &target.name, warning)
            .await;
    }

    let reason_line = reason
        .map(|r| format!("\nReason: {}", html_escape(&r)))
        .unwrap_or_default();

    bot.send_message(
        chat_id,
        format!(
            "⚠️ {} Warning {}/{}{}",
            mention(target.id, &target.name),
            outcome.count,
            outcome.limit,
            reason_line
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_parameters(ReplyParameters::new(msg.id))
    .await?;

    Ok(())
}

/// Handle /warns command.
pub async fn warns_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    if !is_group(&msg) {
        bot.send_message(chat_id, "❌ This command only works in groups.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    // Replied-to user, or the sender
    let (user_id, name) = match get_target(&msg) {
        Some(target) => (target.id, target.name),
        None => match msg.from.as_ref() {
            Some(user) => (user.id, user.first_name.clone()),
            None => return Ok(()),
        },
    };

    let warnings = {
        let chat = state.chats.lock(chat_id.0).await?;
        chat.peek_user(user_id.0)
            .and_then(|user| user.warnings())
            .map(|w| w.warnings().to_vec())
            .unwrap_or_default()
    };

    bot.send_message(chat_id, warns_text(user_id, &name, &warnings, state.warn_limit))
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handle /clearwarnings command.
pub async fn clearwarnings_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    let Some(target) = get_target(&msg) else {
        bot.send_message(chat_id, "❌ Reply to a user's message to clear their warnings.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    let cleared = {
        let mut chat = state.chats.lock(chat_id.0).await?;
        chat.clear_warnings(target.id.0)
    };

    let text = if cleared == 0 {
        format!("ℹ️ {} has no warnings.", mention(target.id, &target.name))
    } else {
        info!("Cleared {} warnings of user {} in chat {}", cleared, target.id, chat_id);
        format!("✅ Warnings of {} cleared.", mention(target.id, &target.name))
    };

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

fn warns_text(user_id: UserId, name: &str, warnings: &[Warning], limit: u32) -> String {
    let who = mention(user_id, name);
    if warnings.is_empty() {
        return format!("✅ {} has no warnings.", who);
    }

    let mut text = format!("⚠️ {} has {}/{} warnings:", who, warnings.len(), limit);
    for (i, warning) in warnings.iter().enumerate() {
        let reason = warning
            .reason
            .as_deref()
            .map(html_escape)
            .unwrap_or_else(|| "no reason".to_string());
        let when = DateTime::from_timestamp(warning.timestamp, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_default();
        text.push_str(&format!("\n{}. {} ({})", i + 1, reason, when));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warns_text_empty() {
        assert_eq!(
            warns_text(UserId(1), "Ann", &[], 3),
            "✅ <a href=\"tg://user?id=1\">Ann</a> has no warnings."
        );
    }

    #[test]
    fn test_warns_text_lists_reasons() {
        let warnings = vec![
            Warning {
                reason: Some("banned word: spam".to_string()),
                timestamp: 0,
            },
            Warning {
                reason: None,
                timestamp: 86_400,
            },
        ];

        assert_eq!(
            warns_text(UserId(1), "Ann", &warnings, 3),
            "⚠️ <a href=\"tg://user?id=1\">Ann</a> has 2/3 warnings:\n\
             1. banned word: spam (1970-01-01 00:00 UTC)\n\
             2. no reason (1970-01-02 00:00 UTC)"
        );
    }
}
