//! Rules plugin.
//!
//! Commands:
//! - /rules - Show the group rules
//! - /setrules <text> - Set the rules (or reply to a message to use its text)

use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use tracing::info;

use super::is_group;
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::utils::non_empty;

/// Handle /rules command.
pub async fn rules_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    if !is_group(&msg) {
        bot.send_message(chat_id, "❌ This command only works in groups.")
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let rules = {
        let chat = state.chats.lock(chat_id.0).await?;
        chat.config().rules_text.clone()
    };

    bot.send_message(chat_id, rules)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handle /setrules command.
pub async fn setrules_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    text: String,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;

    let Some(rules) = rules_text(&msg, &text) else {
        bot.send_message(
            chat_id,
            "Usage: /setrules <text>\nOr reply to a message with /setrules.",
        )
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
        return Ok(());
    };

    {
        let mut chat = state.chats.lock(chat_id.0).await?;
        chat.config_mut().set_rules(rules);
        chat.persist().await?;
    }

    info!("Rules updated in chat {}", chat_id);

    bot.send_message(chat_id, "✅ Rules updated.")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Rules from the command arguments, else from the replied-to message.
fn rules_text<'a>(msg: &'a Message, args: &'a str) -> Option<&'a str> {
    non_empty(args).or_else(|| {
        msg.reply_to_message()
            .and_then(|reply| reply.text())
            .and_then(non_empty)
    })
}
