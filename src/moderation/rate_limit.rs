//! Sliding-window rate limiting.
//!
//! A fixed-limit sliding-window counter: at most `limit` admissions in any
//! `window`, no carry-over of unused capacity.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Kind of action being rate limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Admin issuing /warn
    Warn,
    /// Admin issuing /ban or /kick
    Ban,
    /// Any user sending a group message
    Message,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Ban => "ban",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limit and window for one action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u32,
    pub window: Duration,
}

impl RateLimit {
    pub fn new(limit: u32, window_secs: u64) -> Self {
        Self {
            limit,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Admission timestamps for one (user, action) pair.
#[derive(Debug, Clone, Default)]
pub struct RateLimitWindow {
    timestamps: VecDeque<Instant>,
}

impl RateLimitWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of admissions currently inside the window.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Drop entries older than `window` relative to `now`.
    pub fn prune(&mut self, window: Duration, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) > window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Admission check against the current time.
    pub fn check(&mut self, limit: u32, window: Duration) -> bool {
        self.check_at(limit, window, Instant::now())
    }

    /// Admission check at a given instant.
    ///
    /// Denied attempts are not recorded.
    pub fn check_at(&mut self, limit: u32, window: Duration, now: Instant) -> bool {
        self.prune(window, now);

        if self.timestamps.len() >= limit as usize {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }
}

/// Check and record one attempt in `window`.
pub fn check_rate_limit(window: &mut RateLimitWindow, limit: u32, window_secs: u64) -> bool {
    window.check(limit, Duration::from_secs(window_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    #[test]
    fn test_limit_two_per_minute() {
        let base = Instant::now();
        let window = Duration::from_secs(60);
        let mut w = RateLimitWindow::new();

        assert!(w.check_at(2, window, at(base, 0)));
        assert!(w.check_at(2, window, at(base, 1)));
        assert!(!w.check_at(2, window, at(base, 2)));
        assert!(w.check_at(2, window, at(base, 61)));
    }

    #[test]
    fn test_denied_attempts_are_not_recorded() {
        let base = Instant::now();
        let window = Duration::from_secs(10);
        let mut w = RateLimitWindow::new();

        assert!(w.check_at(1, window, at(base, 0)));
        for s in 1..=10 {
            assert!(!w.check_at(1, window, at(base, s)));
            assert_eq!(w.len(), 1);
        }
        // Only the admission at t=0 ever counted.
        assert!(w.check_at(1, window, at(base, 11)));
    }

    #[test]
    fn test_no_carry_over() {
        let base = Instant::now();
        let window = Duration::from_secs(5);
        let mut w = RateLimitWindow::new();

        // Idle for a long time, then a burst: still clipped at the limit.
        let start = at(base, 1000);
        assert!(w.check_at(3, window, start));
        assert!(w.check_at(3, window, start));
        assert!(w.check_at(3, window, start));
        assert!(!w.check_at(3, window, start));
    }

    #[test]
    fn test_zero_limit_denies_everything() {
        let mut w = RateLimitWindow::new();
        assert!(!check_rate_limit(&mut w, 0, 60));
        assert!(w.is_empty());
    }

    #[test]
    fn test_check_uses_wall_clock() {
        let mut w = RateLimitWindow::new();
        assert!(check_rate_limit(&mut w, 2, 60));
        assert!(check_rate_limit(&mut w, 2, 60));
        assert!(!check_rate_limit(&mut w, 2, 60));
    }
}
