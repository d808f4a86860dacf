//! Account lockout policy.
//!
//! One state machine shared by all four principal types: `Unlocked` with a
//! failure counter, or `Locked` until a deadline. Deterministic — the clock
//! is always passed in, never read here.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Consecutive failures that trigger a lock.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// Length of the lock window, in hours.
pub const LOCK_HOURS: i64 = 2;

/// Lockout bookkeeping carried on every account record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LockoutStatus {
    pub failed_attempts: u32,
    pub lock_until: Option<DateTime<Utc>>,
}

impl LockoutStatus {
    /// Whether the account is currently locked.
    ///
    /// Derived, never stored: true iff a lock deadline exists and is in the
    /// future. An expired deadline means the account is usable again.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lock_until, Some(until) if until > now)
    }

    /// State after a failed credential check.
    ///
    /// An expired lock restarts the count at 1. Otherwise the counter
    /// increments, and reaching the threshold while no lock is active sets a
    /// fresh lock deadline.
    pub fn after_failure(&self, now: DateTime<Utc>) -> Self {
        if let Some(until) = self.lock_until
            && until <= now
        {
            return Self {
                failed_attempts: 1,
                lock_until: None,
            };
        }

        let failed_attempts = self.failed_attempts + 1;
        let lock_until = if failed_attempts >= MAX_FAILED_ATTEMPTS && !self.is_locked(now) {
            Some(now + Duration::hours(LOCK_HOURS))
        } else {
            self.lock_until
        };

        Self {
            failed_attempts,
            lock_until,
        }
    }

    /// State after a successful credential check: counter zeroed, lock gone.
    pub fn after_success(&self) -> Self {
        Self::default()
    }
}
