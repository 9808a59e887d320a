//! Capped exponential backoff used for retry sleeps and rate-limit penalties

use std::time::Duration;

use civic_shared::OtpConfig;
use tracing::debug;

/// `delay(attempt) = min(2^attempt * base, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    /// Delay for attempt 0 in milliseconds
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

impl ExponentialBackoff {
    pub fn new(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn from_config(config: &OtpConfig) -> Self {
        Self::new(config.backoff_base_ms, config.backoff_max_ms)
    }

    /// Calculate the delay for an attempt number
    ///
    /// Saturates at `max_delay_ms` for large attempts instead of overflowing.
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay_ms = 2u64
            .checked_pow(attempt)
            .and_then(|factor| factor.checked_mul(self.base_delay_ms))
            .map_or(self.max_delay_ms, |ms| ms.min(self.max_delay_ms));

        Duration::from_millis(delay_ms)
    }

    /// Sleep for the delay of `attempt`, suspending only the calling task
    pub async fn wait(&self, attempt: u32) {
        let delay = self.delay(attempt);
        debug!(
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            "Backing off before retry"
        );
        tokio::time::sleep(delay).await;
    }
}
