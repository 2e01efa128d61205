//! Ban-word list management.
//!
//! Commands:
//! - /addbanword <word...>
//! - /removebanword <word...>
//! - /listbanwords

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::{BanWordsAdded, BanWordsRemoved};
use crate::utils::{code_list, split_words};

/// Handle /addbanword command.
pub async fn addbanword_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let words = split_words(&args);

    if words.is_empty() {
        bot.send_message(chat_id, "Usage: /addbanword <word> [word...]")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let result = {
        let mut chat = state.chats.lock(chat_id.0).await?;
        let result = chat.config_mut().add_ban_words(words);
        if !result.added.is_empty() {
            chat.persist().await?;
        }
        result
    };

    if !result.added.is_empty() {
        info!("Added ban words {:?} in chat {}", result.added, chat_id);
    }

    bot.send_message(chat_id, added_text(&result))
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handle /removebanword command.
pub async fn removebanword_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let words = split_words(&args);

    if words.is_empty() {
        bot.send_message(chat_id, "Usage: /removebanword <word> [word...]")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let result = {
        let mut chat = state.chats.lock(chat_id.0).await?;
        let result = chat.config_mut().remove_ban_words(words);
        if !result.removed.is_empty() {
            chat.persist().await?;
        }
        result
    };

    if !result.removed.is_empty() {
        info!("Removed ban words {:?} in chat {}", result.removed, chat_id);
    }

    bot.send_message(chat_id, removed_text(&result))
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handle /listbanwords command.
pub async fn listbanwords_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    let words = {
        let chat = state.chats.lock(chat_id.0).await?;
        chat.config().ban_words().to_vec()
    };

    let text = if words.is_empty() {
        "No ban words set.".to_string()
    } else {
        format!("🚫 Ban words ({}):\n{}", words.len(), code_list(&words))
    };

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

fn added_text(result: &BanWordsAdded) -> String {
    let mut lines = Vec::new();
    if !result.added.is_empty() {
        lines.push(format!("✅ Added: {}", code_list(&result.added)));
    }
    if !result.already_present.is_empty() {
        lines.push(format!("ℹ️ Already present: {}", code_list(&result.already_present)));
    }
    lines.join("\n")
}

fn removed_text(result: &BanWordsRemoved) -> String {
    let mut lines = Vec::new();
    if !result.removed.is_empty() {
        lines.push(format!("🗑 Removed: {}", code_list(&result.removed)));
    }
    if !result.not_found.is_empty() {
        lines.push(format!("ℹ️ Not found: {}", code_list(&result.not_found)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::ChatConfig;

    #[test]
    fn test_add_report() {
        let mut config = ChatConfig::with_ban_words(1, ["spam"]);
        let result = config.add_ban_words(split_words("Spam scam <x>"));

        assert_eq!(
            added_text(&result),
            "✅ Added: <code>scam</code>, <code>&lt;x&gt;</code>\n\
             ℹ️ Already present: <code>spam</code>"
        );
    }

    #[test]
    fn test_remove_report() {
        let mut config = ChatConfig::with_ban_words(1, ["spam"]);
        let result = config.remove_ban_words(split_words("nope"));

        assert_eq!(removed_text(&result), "ℹ️ Not found: <code>nope</code>");
    }
}
