//! Welcome event handler.
//!
//! Greets new members with the chat's rules. Only the `new_chat_members`
//! service message triggers a greeting; joins seen as `chat_member`
//! updates are ignored so nobody is welcomed twice.

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters, User, UserId};
use tracing::debug;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::utils::{html_escape, mention};

/// Handle a `new_chat_members` service message.
pub async fn welcome_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(members) = msg.new_chat_members() else {
        return Ok(());
    };

    let humans: Vec<&User> = members.iter().filter(|u| !u.is_bot).collect();
    if humans.is_empty() {
        return Ok(());
    }

    let rules = {
        let chat = state.chats.lock(msg.chat.id.0).await?;
        chat.config().rules_text.clone()
    };

    for user in humans {
        debug!("New member {} joined chat {}", user.id, msg.chat.id);

        bot.send_message(msg.chat.id, welcome_text(user.id, &user.first_name, &rules))
            .parse_mode(ParseMode::Html)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
    }

    Ok(())
}

fn welcome_text(user_id: UserId, name: &str, rules: &str) -> String {
    format!(
        "Welcome {}!\n\n{}",
        mention(user_id, name),
        html_escape(rules)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_text_includes_rules() {
        assert_eq!(
            welcome_text(UserId(5), "Bob", "1. No spam & <b>scams</b>"),
            "Welcome <a href=\"tg://user?id=5\">Bob</a>!\n\n1. No spam &amp; &lt;b&gt;scams&lt;/b&gt;"
        );
    }
}
