//! Ban-word moderation of group messages.
//!
//! Flood control first, then the ban-word check. A violation deletes the
//! message and adds a warning; reaching the limit bans the user and wipes
//! their recent messages.

use futures::future::join_all;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode, UserId};
use tracing::{debug, info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::{ActionKind, Decision, WarningOutcome};
use crate::store::{ChatStates, RecordedWarning};
use crate::utils::mention;

/// Moderate a plain text message.
pub async fn moderation_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }

    let chat_id = msg.chat.id;

    // Admins are exempt from filtering and flood control
    if state.permissions.is_admin(chat_id, user.id).await.unwrap_or(false) {
        return Ok(());
    }

    if !state.rate_limiter.check(user.id.0, ActionKind::Message) {
        debug!("Flood from user {} in chat {}", user.id, chat_id);
        if let Err(e) = bot.delete_message(chat_id, msg.id).await {
            warn!("Failed to delete flood message {} in chat {}: {}", msg.id.0, chat_id, e);
        }
        return Ok(());
    }

    // Only state changes happen under the chat lock; Telegram calls follow.
    let (word, warning) = {
        let mut chat = state.chats.lock(chat_id.0).await?;

        let word = match chat.evaluate(user.id.0, text, msg.id.0) {
            Decision::Allow => return Ok(()),
            Decision::Violation(word) => word,
        };

        let reason = Some(format!("banned word: {}", word));
        let warning = chat.warn(user.id.0, reason, state.warn_limit);
        (word, warning)
    };

    info!(
        "Banned word {:?} from user {} in chat {}",
        word, user.id, chat_id
    );

    if let Err(e) = bot.delete_message(chat_id, msg.id).await {
        warn!("Failed to delete message {} in chat {}: {}", msg.id.0, chat_id, e);
    }

    if warning.outcome.limit_reached {
        ban_for_warnings(&bot, &state.chats, chat_id, user.id, &user.first_name, warning).await?;
    } else {
        bot.send_message(chat_id, warning_text(user.id, &user.first_name, warning.outcome))
            .parse_mode(ParseMode::Html)
            .await?;
    }

    Ok(())
}

/// Warning notice for a user below the limit.
pub fn warning_text(user_id: UserId, name: &str, outcome: WarningOutcome) -> String {
    format!(
        "⚠️ {} Warning {}/{}",
        mention(user_id, name),
        outcome.count,
        outcome.limit
    )
}

/// Ban a user who reached the warning limit.
///
/// Call without holding the chat lock. On success the user's recent
/// messages are deleted and their state is dropped. If the ban fails the
/// warnings stay, so the next violation tries again.
pub async fn ban_for_warnings(
    bot: &ThrottledBot,
    chats: &ChatStates,
    chat_id: ChatId,
    user_id: UserId,
    name: &str,
    warning: RecordedWarning,
) -> anyhow::Result<()> {
    if let Err(e) = bot.ban_chat_member(chat_id, user_id).await {
        warn!("Failed to ban user {} in chat {}: {}", user_id, chat_id, e);
        return Ok(());
    }

    info!(
        "Banned user {} in chat {} after {} warnings",
        user_id, chat_id, warning.outcome.count
    );

    chats.forget_user(chat_id.0, user_id.0).await;
    purge_messages(bot, chat_id, &warning.history).await;

    bot.send_message(
        chat_id,
        format!("🔨 {} User banned after warnings.", mention(user_id, name)),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Delete messages concurrently, logging failures.
async fn purge_messages(bot: &ThrottledBot, chat_id: ChatId, ids: &[i32]) {
    let results = join_all(ids.iter().map(|&id| async move {
        (id, bot.delete_message(chat_id, MessageId(id)).await)
    }))
    .await;

    let mut deleted = 0;
    for (id, result) in results {
        match result {
            Ok(_) => deleted += 1,
            Err(e) => debug!("Failed to delete message {} in chat {}: {}", id, chat_id, e),
        }
    }
    debug!("Purged {}/{} messages in chat {}", deleted, ids.len(), chat_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_text() {
        let outcome = WarningOutcome {
            count: 2,
            limit: 3,
            limit_reached: false,
        };
        assert_eq!(
            warning_text(UserId(7), "Ann <3", outcome),
            "⚠️ <a href=\"tg://user?id=7\">Ann &lt;3</a> Warning 2/3"
        );
    }
}
