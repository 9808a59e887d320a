//! Error types for OTP dispatch and location resolution
//!
//! Provider- and device-specific failure codes are classified once, at the
//! boundary, into the tagged kinds below. User-facing messages are keyed by
//! kind so callers never parse error strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified phone-auth provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// The destination is not a valid phone number
    InvalidDestination,
    /// The provider is throttling this client
    TooManyRequests,
    /// The anti-abuse challenge (reCAPTCHA) was rejected
    ChallengeFailed,
    /// Phone sign-in is not enabled for the project
    VerificationSetup,
    /// The submitted code does not match
    InvalidCode,
    /// The verification session expired
    CodeExpired,
    /// Transport failure reaching the provider
    Network,
    /// The provider did not answer in time
    Timeout,
    /// Anything unrecognised
    Other,
}

impl ProviderErrorKind {
    /// Map a provider error code onto a kind
    ///
    /// Accepts codes with or without the `auth/` namespace prefix.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        let code = code.strip_prefix("auth/").unwrap_or(code);
        match code {
            "invalid-phone-number" | "missing-phone-number" => Self::InvalidDestination,
            "too-many-requests" | "quota-exceeded" => Self::TooManyRequests,
            "captcha-check-failed" | "missing-app-credential" | "invalid-app-credential" => {
                Self::ChallengeFailed
            }
            "operation-not-allowed" => Self::VerificationSetup,
            "invalid-verification-code" | "missing-verification-code" => Self::InvalidCode,
            "code-expired" | "session-expired" | "invalid-verification-id" => Self::CodeExpired,
            "network-request-failed" => Self::Network,
            "timeout" => Self::Timeout,
            _ => Self::Other,
        }
    }

    /// Kinds that can never succeed on retry
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidDestination | Self::VerificationSetup | Self::ChallengeFailed
        )
    }

    /// Canonical kebab-case code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDestination => "invalid-phone-number",
            Self::TooManyRequests => "too-many-requests",
            Self::ChallengeFailed => "captcha-check-failed",
            Self::VerificationSetup => "operation-not-allowed",
            Self::InvalidCode => "invalid-verification-code",
            Self::CodeExpired => "code-expired",
            Self::Network => "network-request-failed",
            Self::Timeout => "timeout",
            Self::Other => "unknown",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidDestination => "Invalid phone number format. Please check the number.",
            Self::TooManyRequests => {
                "Too many requests. Please wait 5 minutes before trying again."
            }
            Self::ChallengeFailed => {
                "reCAPTCHA verification failed. Please refresh the page and try again."
            }
            Self::VerificationSetup => "Phone authentication is not enabled for this project.",
            Self::InvalidCode => "Invalid OTP. Please try again.",
            Self::CodeExpired => "The code has expired. Please request a new one.",
            Self::Network => "Network error. Please check your connection and try again.",
            Self::Timeout => "The request timed out. Please try again.",
            Self::Other => "Failed to send OTP. Please try again.",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Phone-auth provider failure with its classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Provider error ({kind}): {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build from a raw provider code and message
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::from_code(code), message)
    }
}

/// Errors surfaced by the OTP dispatch controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Too many attempts. Please wait {wait_seconds} seconds before trying again.")]
    RateLimited { wait_seconds: u64 },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid verification code format: expected {expected} digits")]
    InvalidCodeFormat { expected: usize },

    #[error("Rate limit store error: {message}")]
    Store { message: String },
}

impl OtpError {
    /// Seconds the caller must wait before re-submitting, if rate limited
    pub fn wait_seconds(&self) -> Option<u64> {
        match self {
            Self::RateLimited { wait_seconds } => Some(*wait_seconds),
            _ => None,
        }
    }

    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self {
            Self::Provider(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { .. } => self.to_string(),
            Self::Provider(e) => e.kind.user_message().to_string(),
            Self::InvalidCodeFormat { expected } => {
                format!("Please enter the {}-digit code.", expected)
            }
            Self::Store { .. } => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Classified device geolocation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unknown,
}

impl LocationErrorKind {
    /// Map a W3C `GeolocationPositionError.code` onto a kind
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location permission denied. Please enable location access in your settings."
            }
            Self::PositionUnavailable => {
                "GPS signal unavailable. Please check if location services are enabled."
            }
            Self::Timeout => "GPS timeout. Getting your location took too long.",
            Self::Unknown => "Unknown location error occurred.",
        }
    }
}

impl fmt::Display for LocationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PermissionDenied => "permission denied",
            Self::PositionUnavailable => "position unavailable",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Device geolocation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Location error ({kind}): {message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        Self::new(
            LocationErrorKind::Timeout,
            format!("No position within {} ms", after.as_millis()),
        )
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}
