//! Plugin system for command handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the handler to `command_handler()` (or `admin_handler()` if
//!    it needs admin rights)

pub mod banwords;
pub mod help;
pub mod restrict;
pub mod rules;
pub mod start;
pub mod warn;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use teloxide::utils::command::BotCommands;
use tracing::warn;

use crate::bot::dispatcher::{AppState, ThrottledBot};

/// All bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Check that the bot is alive")]
    Start(String),

    #[command(description = "Show this help")]
    Help,

    // Rules
    #[command(description = "Show the group rules")]
    Rules,

    #[command(description = "Set the group rules")]
    Setrules(String),

    // Ban words
    #[command(description = "Add ban words (space separated)")]
    Addbanword(String),

    #[command(description = "Remove ban words (space separated)")]
    Removebanword(String),

    #[command(description = "List ban words")]
    Listbanwords,

    // Warnings
    #[command(description = "Warn a user (reply) [reason]")]
    Warn(String),

    #[command(description = "Show warnings (reply, or your own)")]
    Warns,

    #[command(description = "Clear a user's warnings (reply)")]
    Clearwarnings,

    // Restrictions
    #[command(description = "Ban a user (reply) [reason]")]
    Ban(String),

    #[command(description = "Kick a user (reply) [reason]")]
    Kick(String),

    #[command(description = "Mute a user (reply) [duration, e.g. 30m]")]
    Mute(String),

    #[command(description = "Unmute a user (reply)")]
    Unmute,
}

impl Command {
    /// Whether only admins may run this command.
    pub fn requires_admin(&self) -> bool {
        !matches!(
            self,
            Command::Start(_) | Command::Help | Command::Rules | Command::Warns
        )
    }
}

/// Build the combined command handler.
///
/// Admin commands pass one policy check here before any handler runs.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(args)].endpoint(start::start_command))
        .branch(case![Command::Help].endpoint(help::help_command))
        .branch(case![Command::Rules].endpoint(rules::rules_command))
        .branch(case![Command::Warns].endpoint(warn::warns_command))
        .branch(
            dptree::filter(|cmd: Command| cmd.requires_admin())
                .branch(dptree::filter(|msg: Message| !is_group(&msg)).endpoint(group_only))
                .branch(dptree::filter_async(sender_is_admin).chain(admin_handler()))
                .branch(dptree::endpoint(admins_only)),
        )
}

/// Commands that passed the admin check.
fn admin_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    dptree::entry()
        // Rules
        .branch(case![Command::Setrules(text)].endpoint(rules::setrules_command))
        // Ban words
        .branch(case![Command::Addbanword(args)].endpoint(banwords::addbanword_command))
        .branch(case![Command::Removebanword(args)].endpoint(banwords::removebanword_command))
        .branch(case![Command::Listbanwords].endpoint(banwords::listbanwords_command))
        // Warnings
        .branch(case![Command::Warn(reason)].endpoint(warn::warn_command))
        .branch(case![Command::Clearwarnings].endpoint(warn::clearwarnings_command))
        // Restrictions
        .branch(case![Command::Ban(reason)].endpoint(restrict::ban_command))
        .branch(case![Command::Kick(reason)].endpoint(restrict::kick_command))
        .branch(case![Command::Mute(duration)].endpoint(restrict::mute_command))
        .branch(case![Command::Unmute].endpoint(restrict::unmute_command))
}

/// Check if a message was sent in a group.
pub(crate) fn is_group(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

async fn sender_is_admin(msg: Message, state: AppState) -> bool {
    let Some(user) = msg.from.as_ref() else {
        return false;
    };

    match state.permissions.is_admin(msg.chat.id, user.id).await {
        Ok(is_admin) => is_admin,
        Err(e) => {
            warn!(
                "Admin check failed for user {} in chat {}: {}",
                user.id, msg.chat.id, e
            );
            false
        }
    }
}

async fn group_only(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, "❌ This command only works in groups.")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

async fn admins_only(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, "❌ Admins only.")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}
