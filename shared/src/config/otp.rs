//! OTP dispatch rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::env_or;

/// OTP send throttling and retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Sliding window after which an idle destination's counter resets
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Sends allowed per destination inside one window before backoff applies
    #[serde(default = "default_max_attempts_per_window")]
    pub max_attempts_per_window: u32,

    /// Total provider calls per send request (first try included)
    #[serde(default = "default_max_send_attempts")]
    pub max_send_attempts: u32,

    /// Base of the exponential backoff in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound of the exponential backoff in milliseconds
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Cooldown imposed after the provider keeps answering "too many requests"
    #[serde(default = "default_provider_penalty_seconds")]
    pub provider_penalty_seconds: u64,

    /// Attempts added to the counter when the provider cooldown is imposed
    #[serde(default = "default_provider_penalty_attempts")]
    pub provider_penalty_attempts: u32,

    /// Upper bound for a single provider call
    #[serde(default = "default_provider_timeout_seconds")]
    pub provider_timeout_seconds: u64,

    /// Number of digits in a verification code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Country code prepended to national numbers
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            max_attempts_per_window: default_max_attempts_per_window(),
            max_send_attempts: default_max_send_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            provider_penalty_seconds: default_provider_penalty_seconds(),
            provider_penalty_attempts: default_provider_penalty_attempts(),
            provider_timeout_seconds: default_provider_timeout_seconds(),
            code_length: default_code_length(),
            default_country_code: default_country_code(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            window_seconds: env_or("OTP_WINDOW_SECONDS", default_window_seconds()),
            max_attempts_per_window: env_or(
                "OTP_MAX_ATTEMPTS_PER_WINDOW",
                default_max_attempts_per_window(),
            ),
            max_send_attempts: env_or("OTP_MAX_SEND_ATTEMPTS", default_max_send_attempts()),
            provider_timeout_seconds: env_or(
                "OTP_PROVIDER_TIMEOUT_SECONDS",
                default_provider_timeout_seconds(),
            ),
            default_country_code: env_or("OTP_DEFAULT_COUNTRY_CODE", default_country_code()),
            ..Default::default()
        }
    }

    /// Create a development configuration (shorter penalties, same limits)
    pub fn development() -> Self {
        Self {
            provider_penalty_seconds: 60,
            ..Default::default()
        }
    }

    /// Create a production configuration
    pub fn production() -> Self {
        Self::default()
    }
}

fn default_window_seconds() -> u64 {
    300 // 5 minutes
}

fn default_max_attempts_per_window() -> u32 {
    3
}

fn default_max_send_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

fn default_provider_penalty_seconds() -> u64 {
    300 // 5 minutes
}

fn default_provider_penalty_attempts() -> u32 {
    3
}

fn default_provider_timeout_seconds() -> u64 {
    60
}

fn default_code_length() -> usize {
    6
}

fn default_country_code() -> String {
    String::from("+91")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OtpConfig::default();
        assert_eq!(config.window_seconds, 300);
        assert_eq!(config.max_attempts_per_window, 3);
        assert_eq!(config.max_send_attempts, 3);
        assert_eq!(config.backoff_base_ms, 1000);
        assert_eq!(config.backoff_max_ms, 30_000);
        assert_eq!(config.provider_penalty_seconds, 300);
        assert_eq!(config.code_length, 6);
        assert_eq!(config.default_country_code, "+91");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: OtpConfig = serde_json::from_str(r#"{"max_send_attempts": 5}"#).unwrap();
        assert_eq!(config.max_send_attempts, 5);
        assert_eq!(config.window_seconds, 300);
    }
}
