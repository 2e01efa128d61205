//! Event handler system.
//!
//! - `moderation` - ban words, flood control, auto-ban
//! - `welcome` - greet new members with the rules
//! - `leave` - forget users who left
//!
//! Joins are greeted from the service message only; `chat_member` updates
//! are used for cleanup.

pub mod leave;
pub mod moderation;
pub mod welcome;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, MessageEntity, MessageEntityKind};

use crate::bot::dispatcher::AppState;

/// Build the handler for chat member updates.
///
/// Any status change may be a promotion or demotion, so the cached admin
/// status of that user is dropped first.
pub fn member_event_handler() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .inspect(|update: ChatMemberUpdated, state: AppState| {
            state
                .permissions
                .invalidate(update.chat.id, update.new_chat_member.user.id);
        })
        .branch(leave::handler())
}

/// Build the message event handler.
///
/// Service messages are handled first; any other text is moderated.
/// Unknown bot commands are skipped. Text that merely starts with `/` is
/// still moderated.
pub fn message_event_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message| msg.chat.is_group() || msg.chat.is_supergroup())
        .branch(
            dptree::filter(|msg: Message| msg.new_chat_members().is_some())
                .endpoint(welcome::welcome_handler),
        )
        .branch(
            dptree::filter(|msg: Message| msg.left_chat_member().is_some())
                .endpoint(leave::left_message_handler),
        )
        .branch(
            dptree::filter(|msg: Message| {
                msg.text().is_some_and(|t| !t.is_empty())
                    && !starts_with_command(msg.entities().unwrap_or_default())
            })
            .endpoint(moderation::moderation_handler),
        )
}

/// Whether Telegram marked the text as a bot command from the first character.
fn starts_with_command(entities: &[MessageEntity]) -> bool {
    entities
        .iter()
        .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: MessageEntityKind, offset: usize, length: usize) -> MessageEntity {
        MessageEntity {
            kind,
            offset,
            length,
        }
    }

    #[test]
    fn test_bot_command_at_start_is_skipped() {
        // "/unknown hello"
        assert!(starts_with_command(&[entity(MessageEntityKind::BotCommand, 0, 8)]));
    }

    #[test]
    fn test_slash_text_is_moderated() {
        // "/ porn" and "// buy porn here" carry no bot_command entity
        assert!(!starts_with_command(&[]));
        assert!(!starts_with_command(&[entity(MessageEntityKind::Bold, 0, 6)]));

        // "see /rules" has the command later in the text
        assert!(!starts_with_command(&[entity(MessageEntityKind::BotCommand, 4, 6)]));
    }

    #[test]
    fn test_entities_from_telegram_json() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "message_id": 10,
            "date": 1700000000,
            "chat": { "id": -1001, "type": "supergroup", "title": "Group" },
            "from": { "id": 7, "is_bot": false, "first_name": "Ann" },
            "text": "// buy porn here",
        }))
        .unwrap();
        assert!(!starts_with_command(msg.entities().unwrap_or_default()));

        let msg: Message = serde_json::from_value(serde_json::json!({
            "message_id": 11,
            "date": 1700000000,
            "chat": { "id": -1001, "type": "supergroup", "title": "Group" },
            "from": { "id": 7, "is_bot": false, "first_name": "Ann" },
            "text": "/unknown porn",
            "entities": [{ "type": "bot_command", "offset": 0, "length": 8 }],
        }))
        .unwrap();
        assert!(starts_with_command(msg.entities().unwrap_or_default()));
    }
}
