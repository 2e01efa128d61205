//! /start command plugin.

use teloxide::prelude::*;

use crate::bot::dispatcher::ThrottledBot;

const START_TEXT: &str = "🤖 Bot is alive.\n\n\
    I keep groups clean: banned words are removed, repeat offenders are \
    warned and then banned, and new members get the rules.\n\n\
    Add me to a group as an admin and use /help to see the commands.";

/// Handle the /start command. Deep-link payloads are ignored.
pub async fn start_command(bot: ThrottledBot, msg: Message, _args: String) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, START_TEXT).await?;
    Ok(())
}
