//! Target resolution for commands that act on another user.

use teloxide::types::{Message, MessageEntityKind, UserId};

/// The user a command is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: UserId,
    pub name: String,
    pub is_bot: bool,
}

/// Get the target user of a command.
///
/// Resolution order:
/// 1. Reply message → use `reply.from`
/// 2. TextMention entity in the command text
pub fn get_target(msg: &Message) -> Option<Target> {
    if let Some(user) = msg.reply_to_message().and_then(|reply| reply.from.as_ref()) {
        return Some(Target {
            id: user.id,
            name: user.first_name.clone(),
            is_bot: user.is_bot,
        });
    }

    msg.entities()?.iter().find_map(|entity| match &entity.kind {
        MessageEntityKind::TextMention { user } => Some(Target {
            id: user.id,
            name: user.first_name.clone(),
            is_bot: user.is_bot,
        }),
        _ => None,
    })
}
