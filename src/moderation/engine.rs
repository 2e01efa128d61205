//! Message evaluation against a chat's ban words.

use super::{ChatConfig, UserState};

/// Outcome of evaluating one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// The message contains this ban word.
    Violation(String),
}

impl Decision {
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Violation(_))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whole-word search: `needle` must not be glued to word characters on
/// either side ("ass" does not match "classic").
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    // Step one char at a time so overlapping candidates are not skipped.
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();

        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_word_char(c));
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !is_word_char(c));
        if before_ok && after_ok {
            return true;
        }

        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }

    false
}

/// Find the first ban word (in list order) present in `text`.
pub fn find_ban_word<'a>(config: &'a ChatConfig, text: &str) -> Option<&'a str> {
    let lowered = text.to_lowercase();
    config
        .ban_words()
        .iter()
        .map(String::as_str)
        .find(|word| contains_whole_word(&lowered, word))
}

/// Evaluate a non-empty text message.
///
/// Allowed messages are appended to the sender's history.
pub fn evaluate_message(
    config: &ChatConfig,
    user: &mut UserState,
    text: &str,
    message_id: i32,
) -> Decision {
    match find_ban_word(config, text) {
        Some(word) => Decision::Violation(word.to_string()),
        None => {
            user.history.push(message_id);
            Decision::Allow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moderation::WARNING_LIMIT;

    fn config(words: &[&str]) -> ChatConfig {
        ChatConfig::with_ban_words(1, words)
    }

    #[test]
    fn test_whole_word_not_substring() {
        let cfg = config(&["ass"]);
        let mut user = UserState::default();

        assert_eq!(evaluate_message(&cfg, &mut user, "classic", 1), Decision::Allow);
        assert_eq!(
            evaluate_message(&cfg, &mut user, "you are an ass", 2),
            Decision::Violation("ass".to_string())
        );
    }

    #[test]
    fn test_case_and_punctuation() {
        let cfg = config(&["spam"]);
        let mut user = UserState::default();

        assert!(evaluate_message(&cfg, &mut user, "SPAM!", 1).is_violation());
        assert!(evaluate_message(&cfg, &mut user, "(spam)", 2).is_violation());
        assert!(!evaluate_message(&cfg, &mut user, "spam_bot", 3).is_violation());
        assert!(!evaluate_message(&cfg, &mut user, "spammer", 4).is_violation());
    }

    #[test]
    fn test_later_occurrence_matches_after_glued_one() {
        let cfg = config(&["sex"]);
        let mut user = UserState::default();

        assert!(evaluate_message(&cfg, &mut user, "sussex sex", 1).is_violation());
        assert!(!evaluate_message(&cfg, &mut user, "sussex essex", 2).is_violation());
    }

    #[test]
    fn test_multi_word_phrase() {
        let cfg = config(&["free money"]);
        let mut user = UserState::default();

        assert!(evaluate_message(&cfg, &mut user, "Get FREE MONEY now", 1).is_violation());
        assert!(!evaluate_message(&cfg, &mut user, "free moneys", 2).is_violation());
    }

    #[test]
    fn test_non_ascii_boundaries() {
        let cfg = config(&["мат"]);
        let mut user = UserState::default();

        assert!(evaluate_message(&cfg, &mut user, "это МАТ.", 1).is_violation());
        assert!(!evaluate_message(&cfg, &mut user, "математика", 2).is_violation());
    }

    #[test]
    fn test_first_listed_word_wins() {
        let cfg = config(&["beta", "alpha"]);
        let mut user = UserState::default();

        assert_eq!(
            evaluate_message(&cfg, &mut user, "alpha beta", 1),
            Decision::Violation("beta".to_string())
        );
    }

    #[test]
    fn test_history_only_on_allow() {
        let cfg = config(&["spam"]);
        let mut user = UserState::default();

        evaluate_message(&cfg, &mut user, "hello", 10);
        evaluate_message(&cfg, &mut user, "spam", 11);
        evaluate_message(&cfg, &mut user, "bye", 12);

        assert_eq!(user.history.ids().collect::<Vec<_>>(), vec![10, 12]);
    }

    #[test]
    fn test_empty_ban_list_allows() {
        let cfg = config(&[]);
        let mut user = UserState::default();
        assert_eq!(evaluate_message(&cfg, &mut user, "anything", 1), Decision::Allow);
    }

    #[test]
    fn test_three_strikes_scenario() {
        let cfg = config(&["spam"]);
        let mut user = UserState::default();

        for expected in 1..=3 {
            let decision = evaluate_message(&cfg, &mut user, "no spam here", expected as i32);
            assert_eq!(decision, Decision::Violation("spam".to_string()));

            let outcome = user.record_warning(Some("spam".into()), WARNING_LIMIT);
            assert_eq!(outcome.count, expected);
            assert_eq!(outcome.limit_reached, expected == 3);
        }
    }
}
