//! Per-user, per-action rate limiter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use tracing::debug;

use crate::config::RateLimits;
use crate::moderation::{ActionKind, RateLimitWindow};

/// Checks between sweeps of idle keys.
const SWEEP_INTERVAL: u64 = 1024;

/// Sliding-window limiter keyed by `(user_id, action)`.
///
/// Keys whose window has emptied are dropped every [`SWEEP_INTERVAL`]
/// checks, so memory follows the active users rather than every user seen.
pub struct RateLimiter {
    limits: RateLimits,
    windows: DashMap<(u64, ActionKind), RateLimitWindow>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            windows: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    /// Number of tracked `(user, action)` keys.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Admit (and record) one action, or deny it.
    pub fn check(&self, user_id: u64, kind: ActionKind) -> bool {
        self.check_at(user_id, kind, Instant::now())
    }

    /// Admission check at a given instant.
    pub fn check_at(&self, user_id: u64, kind: ActionKind, now: Instant) -> bool {
        let limit = self.limits.for_kind(kind);
        let admitted = self
            .windows
            .entry((user_id, kind))
            .or_default()
            .check_at(limit.limit, limit.window, now);

        if !admitted {
            debug!("Rate limit hit: user {} action {}", user_id, kind);
        }

        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep_at(now);
        }
        admitted
    }

    /// Drop keys with no admissions left inside their window.
    pub fn sweep_at(&self, now: Instant) {
        let before = self.tracked_keys();
        self.windows.retain(|(_, kind), window| {
            window.prune(self.limits.for_kind(*kind).window, now);
            !window.is_empty()
        });

        let dropped = before.saturating_sub(self.tracked_keys());
        if dropped > 0 {
            debug!("Rate limiter dropped {} idle keys", dropped);
        }
    }
}
