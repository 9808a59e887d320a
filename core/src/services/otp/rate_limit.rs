//! Per-destination admission rules for OTP sends

use chrono::{DateTime, Duration, Utc};
use civic_shared::OtpConfig;

use crate::domain::{Admission, RateLimitEntry};

use super::backoff::ExponentialBackoff;

/// Window, attempt cap and penalties applied to every destination
///
/// The methods mutate a store slot in place and never suspend, so a store
/// that applies them under a single lock makes each decision atomic.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    window: Duration,
    max_attempts: u32,
    backoff: ExponentialBackoff,
    penalty: Duration,
    penalty_attempts: u32,
}

impl RateLimitPolicy {
    pub fn from_config(config: &OtpConfig) -> Self {
        Self {
            window: Duration::seconds(config.window_seconds as i64),
            max_attempts: config.max_attempts_per_window,
            backoff: ExponentialBackoff::from_config(config),
            penalty: Duration::seconds(config.provider_penalty_seconds as i64),
            penalty_attempts: config.provider_penalty_attempts,
        }
    }

    pub fn backoff(&self) -> &ExponentialBackoff {
        &self.backoff
    }

    /// Decide whether an attempt at `now` may reach the provider
    pub fn admit(&self, slot: &mut Option<RateLimitEntry>, now: DateTime<Utc>) -> Admission {
        let entry = match slot {
            None => {
                *slot = Some(RateLimitEntry::first_attempt(now));
                return Admission::Allowed { attempt: 1 };
            }
            Some(entry) => entry,
        };

        if entry.is_backing_off(now) {
            return Admission::Rejected {
                wait: to_std(entry.remaining_backoff(now)),
            };
        }

        if entry.is_stale(now, self.window) {
            *entry = RateLimitEntry::first_attempt(now);
            return Admission::Allowed { attempt: 1 };
        }

        entry.attempt_count = entry.attempt_count.saturating_add(1);
        entry.last_attempt_at = now;

        if entry.attempt_count > self.max_attempts {
            let delay = self.backoff.delay(entry.attempt_count - self.max_attempts);
            entry.backoff_until = Some(now + from_std(delay));
            return Admission::Rejected { wait: delay };
        }

        Admission::Allowed {
            attempt: entry.attempt_count,
        }
    }

    /// Impose the provider cooldown after retries were exhausted
    pub fn penalize(&self, slot: &mut Option<RateLimitEntry>, now: DateTime<Utc>) -> Admission {
        let entry = slot.get_or_insert_with(|| RateLimitEntry {
            attempt_count: 0,
            last_attempt_at: now,
            backoff_until: None,
        });
        entry.attempt_count = entry.attempt_count.saturating_add(self.penalty_attempts);
        entry.backoff_until = Some(now + self.penalty);

        Admission::Rejected {
            wait: to_std(self.penalty),
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::from_config(&OtpConfig::default())
    }
}

fn to_std(duration: Duration) -> std::time::Duration {
    duration.to_std().unwrap_or(std::time::Duration::ZERO)
}

fn from_std(duration: std::time::Duration) -> Duration {
    Duration::from_std(duration).unwrap_or_else(|_| Duration::max_value())
}
