//! /help command plugin.

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::Command;
use crate::bot::dispatcher::ThrottledBot;

/// Handle the /help command.
pub async fn help_command(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, help_text()).await?;
    Ok(())
}

fn help_text() -> String {
    format!(
        "{}\n\nEverything except /start, /help, /rules and /warns needs admin rights.",
        Command::descriptions()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let text = help_text();
        for command in ["/setrules", "/addbanword", "/removebanword", "/listbanwords", "/warn", "/clearwarnings"] {
            assert!(text.contains(command), "{} missing from help", command);
        }
    }
}
