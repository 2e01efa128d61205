//! Member leave handling.
//!
//! Drops the warnings and message history of users who left or were
//! removed. Both the `left_chat_member` service message and `chat_member`
//! updates lead here; clearing twice is harmless.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberUpdated, UserId};
use tracing::debug;

use crate::bot::dispatcher::AppState;

/// Returns the handler for member leave updates.
pub fn handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(is_member_left).endpoint(member_left_handler)
}

/// Check if this is a member leaving.
fn is_member_left(update: ChatMemberUpdated) -> bool {
    update.old_chat_member.is_present() && !update.new_chat_member.is_present()
}

async fn member_left_handler(update: ChatMemberUpdated, state: AppState) -> anyhow::Result<()> {
    user_left(&state, update.chat.id, update.old_chat_member.user.id).await;
    Ok(())
}

/// Handle a `left_chat_member` service message.
pub async fn left_message_handler(msg: Message, state: AppState) -> anyhow::Result<()> {
    if let Some(user) = msg.left_chat_member() {
        user_left(&state, msg.chat.id, user.id).await;
    }
    Ok(())
}

async fn user_left(state: &AppState, chat_id: ChatId, user_id: UserId) {
    if state.chats.forget_user(chat_id.0, user_id.0).await {
        debug!("User {} left chat {}, state cleared", user_id, chat_id);
    }
}
