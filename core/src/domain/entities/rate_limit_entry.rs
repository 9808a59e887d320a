//! Per-destination OTP send bookkeeping.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Send attempt tracking for a single destination (phone number)
///
/// Created on the first send attempt, updated on every attempt and removed
/// entirely once a send succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    /// Attempts since the last reset
    pub attempt_count: u32,

    /// When the most recent attempt was made
    pub last_attempt_at: DateTime<Utc>,

    /// Attempts before this instant are rejected; `None` means no backoff
    pub backoff_until: Option<DateTime<Utc>>,
}

impl RateLimitEntry {
    /// A fresh entry recording one attempt at `now`
    pub fn first_attempt(now: DateTime<Utc>) -> Self {
        Self {
            attempt_count: 1,
            last_attempt_at: now,
            backoff_until: None,
        }
    }

    /// Whether the entry is still inside a backoff period
    pub fn is_backing_off(&self, now: DateTime<Utc>) -> bool {
        self.backoff_until.is_some_and(|until| now < until)
    }

    /// Remaining backoff, zero when none applies
    pub fn remaining_backoff(&self, now: DateTime<Utc>) -> Duration {
        match self.backoff_until {
            Some(until) if now < until => until - now,
            _ => Duration::zero(),
        }
    }

    /// Whether the last attempt is older than `window`
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.last_attempt_at > window
    }
}
