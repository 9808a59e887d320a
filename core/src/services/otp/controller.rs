//! OTP dispatch controller
//!
//! Sits between callers asking for a code and the phone-auth provider.
//! Every send passes a per-destination rate-limit check first; provider
//! throttling is retried with exponential backoff up to a fixed number of
//! attempts, after which the destination is put on a long cooldown.

use std::sync::Arc;
use std::time::Duration;

use civic_shared::phone::{mask_phone_number, with_country_code};
use civic_shared::OtpConfig;
use tracing::{debug, error, info, warn};

use crate::domain::{Admission, AuthSession, ConfirmationHandle, RateLimitEntry};
use crate::errors::{OtpError, OtpResult, ProviderError, ProviderErrorKind};
use crate::repositories::rate_limit::RateLimitStore;
use crate::services::clock::{Clock, SystemClock};

use super::rate_limit::RateLimitPolicy;
use super::traits::PhoneAuthProvider;

/// Rate-limited, retrying front for a [`PhoneAuthProvider`]
pub struct OtpDispatchController<P: PhoneAuthProvider> {
    /// Provider that actually sends codes
    provider: Arc<P>,
    /// Per-destination attempt bookkeeping
    store: Arc<dyn RateLimitStore>,
    /// Time source for window and backoff arithmetic
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
    config: OtpConfig,
}

impl<P: PhoneAuthProvider> OtpDispatchController<P> {
    /// Create a controller using the system clock
    ///
    /// # Arguments
    ///
    /// * `provider` - Phone-auth provider implementation
    /// * `store` - Rate-limit store shared by every controller of the process
    /// * `config` - Window, retry and backoff settings
    pub fn new(provider: Arc<P>, store: Arc<dyn RateLimitStore>, config: OtpConfig) -> Self {
        Self {
            provider,
            store,
            clock: Arc::new(SystemClock),
            policy: RateLimitPolicy::from_config(&config),
            config,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Send a code to `destination`
    ///
    /// This method:
    /// 1. Normalizes the destination into its rate-limit key
    /// 2. Rejects the call without a provider request while backing off
    /// 3. Calls the provider, retrying throttled attempts with backoff
    /// 4. Clears the destination's entry on success
    ///
    /// # Returns
    ///
    /// * `Ok(ConfirmationHandle)` - Code sent; pass the handle to [`confirm_code`](Self::confirm_code)
    /// * `Err(OtpError::RateLimited)` - Caller must wait `wait_seconds`
    /// * `Err(OtpError::Provider)` - The provider refused the send
    pub async fn request_send(&self, destination: &str) -> OtpResult<ConfirmationHandle> {
        let key = self.destination_key(destination);
        let masked = mask_phone_number(&key);

        let admission = self.admit(&key).await?;
        let attempt_in_window = match admission {
            Admission::Allowed { attempt } => attempt,
            Admission::Rejected { .. } => {
                let wait_seconds = admission.wait_seconds();
                warn!(
                    phone = %masked,
                    wait_seconds = wait_seconds,
                    event = "otp_rate_limited",
                    "OTP send rejected by rate limit"
                );
                return Err(OtpError::RateLimited { wait_seconds });
            }
        };

        let max_attempts = self.config.max_send_attempts.max(1);
        let mut last_error: Option<ProviderError> = None;

        for attempt in 1..=max_attempts {
            info!(
                phone = %masked,
                attempt = attempt,
                max_attempts = max_attempts,
                window_attempt = attempt_in_window,
                provider = self.provider.provider_name(),
                event = "otp_send_attempt",
                "Sending OTP"
            );

            let error = match self.send_once(&key).await {
                Ok(handle) => {
                    if let Err(e) = self.store.remove(&key).await {
                        error!(
                            phone = %masked,
                            error = %e,
                            event = "otp_rate_limit_clear_failed",
                            "Failed to clear rate limit entry after successful send"
                        );
                    }
                    info!(
                        phone = %masked,
                        attempt = attempt,
                        event = "otp_sent",
                        "OTP sent successfully"
                    );
                    return Ok(handle);
                }
                Err(error) => error,
            };

            warn!(
                phone = %masked,
                attempt = attempt,
                kind = %error.kind,
                error = %error.message,
                event = "otp_send_failed",
                "OTP provider call failed"
            );

            match error.kind {
                ProviderErrorKind::TooManyRequests if attempt < max_attempts => {
                    self.policy.backoff().wait(attempt).await;
                    last_error = Some(error);
                }
                ProviderErrorKind::TooManyRequests => {
                    return Err(self.penalize(&key, &masked).await);
                }
                kind if kind.is_permanent() => return Err(OtpError::Provider(error)),
                _ if attempt == 1 => return Err(OtpError::Provider(error)),
                _ => last_error = Some(error),
            }
        }

        Err(OtpError::Provider(last_error.unwrap_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::Other,
                "Failed to send OTP after multiple attempts",
            )
        })))
    }

    /// Confirm a code sent earlier under `handle`
    ///
    /// Codes that are not exactly `code_length` ASCII digits are rejected
    /// without contacting the provider.
    pub async fn confirm_code(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> OtpResult<AuthSession> {
        let code = code.trim();
        let expected = self.config.code_length;
        if code.len() != expected || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpError::InvalidCodeFormat { expected });
        }

        let masked = mask_phone_number(&handle.destination);
        let timeout = self.provider_timeout();
        let result = match tokio::time::timeout(timeout, self.provider.confirm(handle, code)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::new(
                ProviderErrorKind::Timeout,
                format!("Provider did not confirm within {} s", timeout.as_secs()),
            )),
        };

        match result {
            Ok(session) => {
                info!(
                    phone = %masked,
                    is_new_user = session.is_new_user,
                    event = "otp_confirmed",
                    "OTP confirmed"
                );
                Ok(session)
            }
            Err(error) => {
                warn!(
                    phone = %masked,
                    kind = %error.kind,
                    event = "otp_confirm_failed",
                    "OTP confirmation failed"
                );
                Err(OtpError::Provider(error))
            }
        }
    }

    /// Current bookkeeping for `destination`, for countdown rendering
    pub async fn rate_limit_status(&self, destination: &str) -> OtpResult<Option<RateLimitEntry>> {
        let key = self.destination_key(destination);
        self.store
            .get(&key)
            .await
            .map_err(|message| OtpError::Store { message })
    }

    /// Forget all attempts for `destination`
    pub async fn reset(&self, destination: &str) -> OtpResult<()> {
        let key = self.destination_key(destination);
        debug!(phone = %mask_phone_number(&key), "Resetting OTP rate limit");
        self.store
            .remove(&key)
            .await
            .map_err(|message| OtpError::Store { message })
    }

    fn destination_key(&self, destination: &str) -> String {
        with_country_code(destination, &self.config.default_country_code)
    }

    fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.config.provider_timeout_seconds)
    }

    async fn admit(&self, key: &str) -> OtpResult<Admission> {
        let policy = self.policy.clone();
        let now = self.clock.now();
        self.store
            .update(key, Box::new(move |slot| policy.admit(slot, now)))
            .await
            .map_err(|message| OtpError::Store { message })
    }

    async fn penalize(&self, key: &str, masked: &str) -> OtpError {
        let policy = self.policy.clone();
        let now = self.clock.now();
        let admission = self
            .store
            .update(key, Box::new(move |slot| policy.penalize(slot, now)))
            .await;

        match admission {
            Ok(admission) => {
                let wait_seconds = admission.wait_seconds();
                warn!(
                    phone = %masked,
                    wait_seconds = wait_seconds,
                    event = "otp_provider_cooldown",
                    "Provider throttling persisted; destination on cooldown"
                );
                OtpError::RateLimited { wait_seconds }
            }
            Err(message) => OtpError::Store { message },
        }
    }

    async fn send_once(&self, key: &str) -> Result<ConfirmationHandle, ProviderError> {
        let timeout = self.provider_timeout();
        match tokio::time::timeout(timeout, self.provider.send_code(key)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::new(
                ProviderErrorKind::Timeout,
                format!("Provider did not answer within {} s", timeout.as_secs()),
            )),
        }
    }
}
