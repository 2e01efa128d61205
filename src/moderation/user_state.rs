//! Per-user transient moderation state: warnings and recent messages.

use std::collections::VecDeque;

/// Default number of warnings before a ban is requested.
pub const WARNING_LIMIT: u32 = 3;

/// Number of message IDs remembered per user.
pub const HISTORY_CAPACITY: usize = 10;

/// Individual warning entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub reason: Option<String>,
    /// Unix timestamp when the warning was issued
    pub timestamp: i64,
}

impl Warning {
    pub fn new(reason: Option<String>) -> Self {
        Self {
            reason,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Accumulated warnings of one user in one chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserWarningState {
    warnings: Vec<Warning>,
}

impl UserWarningState {
    pub fn count(&self) -> u32 {
        self.warnings.len() as u32
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// What a new warning amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningOutcome {
    pub count: u32,
    pub limit: u32,
    /// The caller should ban the user.
    pub limit_reached: bool,
}

/// Bounded FIFO of a user's most recent allowed message IDs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageHistory {
    recent: VecDeque<i32>,
}

impl MessageHistory {
    /// Append a message ID, evicting the oldest beyond capacity.
    pub fn push(&mut self, message_id: i32) {
        if self.recent.len() == HISTORY_CAPACITY {
            self.recent.pop_front();
        }
        self.recent.push_back(message_id);
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// IDs oldest first.
    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.recent.iter().copied()
    }

    /// Take all IDs out, oldest first.
    pub fn drain(&mut self) -> Vec<i32> {
        self.recent.drain(..).collect()
    }
}

/// Everything tracked for one (chat, user) pair.
#[derive(Debug, Clone, Default)]
pub struct UserState {
    warnings: Option<UserWarningState>,
    pub history: MessageHistory,
}

impl UserState {
    /// Current warning count (0 when no warning state exists).
    pub fn warning_count(&self) -> u32 {
        self.warnings.as_ref().map(UserWarningState::count).unwrap_or(0)
    }

    pub fn warnings(&self) -> Option<&UserWarningState> {
        self.warnings.as_ref()
    }

    /// Record one warning. Every call increments the count.
    pub fn record_warning(&mut self, reason: Option<String>, limit: u32) -> WarningOutcome {
        let state = self.warnings.get_or_insert_with(UserWarningState::default);
        state.warnings.push(Warning::new(reason));

        let count = state.count();
        WarningOutcome {
            count,
            limit,
            limit_reached: count >= limit,
        }
    }

    /// Drop the warning state entirely.
    pub fn clear_warnings(&mut self) {
        self.warnings = None;
    }

    /// Nothing left worth keeping for this user.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_none() && self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_warning_counts_up_to_limit() {
        let mut user = UserState::default();

        for k in 1..=5 {
            let outcome = user.record_warning(None, WARNING_LIMIT);
            assert_eq!(outcome.count, k);
            assert_eq!(outcome.limit_reached, k >= 3);
        }
        assert_eq!(user.warning_count(), 5);
    }

    #[test]
    fn test_clear_then_warn_starts_over() {
        let mut user = UserState::default();
        user.record_warning(Some("one".into()), WARNING_LIMIT);
        user.record_warning(Some("two".into()), WARNING_LIMIT);

        user.clear_warnings();
        assert_eq!(user.warning_count(), 0);
        assert!(user.warnings().is_none());

        let outcome = user.record_warning(None, WARNING_LIMIT);
        assert_eq!(outcome.count, 1);
        assert!(!outcome.limit_reached);
    }

    #[test]
    fn test_reasons_are_kept_in_order() {
        let mut user = UserState::default();
        user.record_warning(Some("flood".into()), 3);
        user.record_warning(None, 3);

        let reasons: Vec<_> = user
            .warnings()
            .unwrap()
            .warnings()
            .iter()
            .map(|w| w.reason.clone())
            .collect();
        assert_eq!(reasons, vec![Some("flood".to_string()), None]);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = MessageHistory::default();
        for id in 1..=11 {
            history.push(id);
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.ids().collect::<Vec<_>>(), (2..=11).collect::<Vec<_>>());
    }

    #[test]
    fn test_history_drain_empties() {
        let mut history = MessageHistory::default();
        history.push(7);
        history.push(8);

        assert_eq!(history.drain(), vec![7, 8]);
        assert!(history.is_empty());
    }
}
