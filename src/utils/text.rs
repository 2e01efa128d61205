//! Text helpers for command parsing and HTML replies.

use std::time::Duration;

use teloxide::types::UserId;

/// Escape text for Telegram's HTML parse mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Clickable HTML mention of a user.
pub fn mention(user_id: UserId, name: &str) -> String {
    format!("<a href=\"tg://user?id={}\">{}</a>", user_id, html_escape(name))
}

/// Arguments of a command as whitespace-separated words.
pub fn split_words(args: &str) -> Vec<&str> {
    args.split_whitespace().collect()
}

/// Command arguments as trimmed text, `None` when blank.
pub fn non_empty(args: &str) -> Option<&str> {
    let args = args.trim();
    (!args.is_empty()).then_some(args)
}

/// Render a list of words as `<code>a</code>, <code>b</code>`.
pub fn code_list(words: &[String]) -> String {
    words
        .iter()
        .map(|w| format!("<code>{}</code>", html_escape(w)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable duration.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{} seconds", secs)
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else if secs < 86400 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins > 0 {
            format!("{} hours {} minutes", hours, mins)
        } else {
            format!("{} hours", hours)
        }
    } else {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours > 0 {
            format!("{} days {} hours", days, hours)
        } else {
            format!("{} days", days)
        }
    }
}

/// Parse duration string (e.g., "1h", "30m", "1d", "2w").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();
    let (unit_start, _) = s.char_indices().last()?;
    let (amount, unit) = s.split_at(unit_start);
    let amount: u64 = amount.parse().ok()?;

    let unit_secs: u64 = match unit {
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 604800,
        _ => return None,
    };

    amount.checked_mul(unit_secs).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
    }

    #[test]
    fn test_mention() {
        assert_eq!(
            mention(UserId(42), "A<B"),
            "<a href=\"tg://user?id=42\">A&lt;B</a>"
        );
    }

    #[test]
    fn test_args_helpers() {
        assert_eq!(split_words("  spam  scam\tbot "), vec!["spam", "scam", "bot"]);
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(" be nice "), Some("be nice"));
        assert_eq!(
            code_list(&["a".into(), "<b>".into()]),
            "<code>a</code>, <code>&lt;b&gt;</code>"
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30m"), Some(Duration::from_secs(1800)));
        assert_eq!(parse_duration("1H"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86400)));
        assert_eq!(parse_duration("1w"), Some(Duration::from_secs(604800)));
        assert_eq!(parse_duration("m"), None);
        assert_eq!(parse_duration("10x"), None);
        assert_eq!(parse_duration("5м"), None);
        assert_eq!(parse_duration("invalid"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45 seconds");
        assert_eq!(format_duration(1800), "30 minutes");
        assert_eq!(format_duration(5400), "1 hours 30 minutes");
        assert_eq!(format_duration(86400), "1 days");
        assert_eq!(format_duration(90000), "1 days 1 hours");
    }

    #[test]
    fn test_parse_duration_overflow_is_rejected() {
        assert_eq!(parse_duration("99999999999999999w"), None);
        assert_eq!(parse_duration("18446744073709551615m"), None);
        assert_eq!(parse_duration("1000w"), Some(Duration::from_secs(604_800_000)));
    }
}
