//! Identity Toolkit phone-auth provider
//!
//! Speaks the Identity Toolkit REST API used by hosted phone sign-in:
//! `accounts:sendVerificationCode` issues a session for a destination and
//! `accounts:signInWithPhoneNumber` exchanges the session and code for an
//! identity token.
//!
//! ## Features
//!
//! - E.164 normalisation with the `phonenumber` crate before any request
//! - REST error messages classified into [`ProviderErrorKind`]
//! - Per-request timeout
//! - Security: phone number masking in logs

use std::time::Duration;

use async_trait::async_trait;
use civic_core::domain::{AuthSession, ConfirmationHandle};
use civic_core::errors::{ProviderError, ProviderErrorKind};
use civic_core::services::PhoneAuthProvider;
use civic_shared::phone::mask_phone_number;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::phone::to_e164;
use crate::InfrastructureError;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Identity Toolkit client configuration
#[derive(Debug, Clone)]
pub struct IdentityToolkitConfig {
    /// Web API key of the project
    pub api_key: String,
    /// API root, without trailing slash
    pub base_url: String,
    /// Token from a solved reCAPTCHA challenge, when the project requires one
    pub recaptcha_token: Option<String>,
    /// Country code applied to national numbers
    pub default_country_code: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl IdentityToolkitConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            recaptcha_token: None,
            default_country_code: "+91".to_string(),
            request_timeout_secs: 30,
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, InfrastructureError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("IDENTITY_TOOLKIT_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                InfrastructureError::Config("IDENTITY_TOOLKIT_API_KEY not set".to_string())
            })?;

        let defaults = Self::new(api_key);
        Ok(Self {
            base_url: var("IDENTITY_TOOLKIT_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url.clone()),
            recaptcha_token: var("IDENTITY_TOOLKIT_RECAPTCHA_TOKEN"),
            default_country_code: var("OTP_DEFAULT_COUNTRY_CODE")
                .unwrap_or(defaults.default_country_code.clone()),
            request_timeout_secs: var("IDENTITY_TOOLKIT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
            ..defaults
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendCodeRequest<'a> {
    phone_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recaptcha_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendCodeResponse {
    session_info: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    session_info: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: Option<String>,
    local_id: String,
    phone_number: Option<String>,
    #[serde(default)]
    is_new_user: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Classify an Identity Toolkit error message
///
/// Messages may carry a detail suffix (`INVALID_PHONE_NUMBER : TOO_SHORT`);
/// only the leading token is significant.
pub fn classify_error_message(message: &str) -> ProviderErrorKind {
    let token = message
        .split(|c: char| c == ':' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or_default();

    match token {
        "TOO_MANY_ATTEMPTS_TRY_LATER" | "QUOTA_EXCEEDED" => ProviderErrorKind::TooManyRequests,
        "INVALID_PHONE_NUMBER" | "MISSING_PHONE_NUMBER" => ProviderErrorKind::InvalidDestination,
        "CAPTCHA_CHECK_FAILED" | "MISSING_RECAPTCHA_TOKEN" | "INVALID_RECAPTCHA_TOKEN"
        | "INVALID_APP_CREDENTIAL" | "MISSING_APP_CREDENTIAL" => ProviderErrorKind::ChallengeFailed,
        "OPERATION_NOT_ALLOWED" | "PROJECT_NOT_FOUND" => ProviderErrorKind::VerificationSetup,
        "INVALID_CODE" | "MISSING_CODE" => ProviderErrorKind::InvalidCode,
        "SESSION_EXPIRED" | "INVALID_SESSION_INFO" | "MISSING_SESSION_INFO" => {
            ProviderErrorKind::CodeExpired
        }
        _ => ProviderErrorKind::Other,
    }
}

fn classify_response(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_default();

    let kind = match classify_error_message(&message) {
        ProviderErrorKind::Other if status == StatusCode::TOO_MANY_REQUESTS => {
            ProviderErrorKind::TooManyRequests
        }
        ProviderErrorKind::Other if status.is_server_error() => ProviderErrorKind::Network,
        kind => kind,
    };

    let message = if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        message
    };
    ProviderError::new(kind, message)
}

fn classify_transport(error: reqwest::Error) -> ProviderError {
    let kind = if error.is_timeout() {
        ProviderErrorKind::Timeout
    } else if error.is_connect() || error.is_request() {
        ProviderErrorKind::Network
    } else {
        ProviderErrorKind::Other
    };
    ProviderError::new(kind, error.to_string())
}

/// Identity Toolkit phone-auth provider
pub struct IdentityToolkitPhoneAuth {
    client: Client,
    config: IdentityToolkitConfig,
}

impl IdentityToolkitPhoneAuth {
    pub fn new(config: IdentityToolkitConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            base_url = %config.base_url,
            "Identity Toolkit phone auth initialized"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Self::new(IdentityToolkitConfig::from_env()?)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}", self.config.base_url, method)
    }

    async fn post<B, R>(&self, method: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(self.endpoint(method))
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            return Err(classify_response(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::Other,
                format!("Unexpected {} response: {}", method, e),
            )
        })
    }
}

#[async_trait]
impl PhoneAuthProvider for IdentityToolkitPhoneAuth {
    async fn send_code(&self, destination: &str) -> Result<ConfirmationHandle, ProviderError> {
        let phone = to_e164(destination, &self.config.default_country_code)?;
        debug!(phone = %mask_phone_number(&phone), "Requesting verification code");

        let request = SendCodeRequest {
            phone_number: &phone,
            recaptcha_token: self.config.recaptcha_token.as_deref(),
        };
        let response: SendCodeResponse = self
            .post("sendVerificationCode", &request)
            .await
            .map_err(|e| {
                warn!(
                    phone = %mask_phone_number(&phone),
                    kind = %e.kind,
                    "Identity Toolkit rejected verification request"
                );
                e
            })?;

        Ok(ConfirmationHandle::new(response.session_info, phone))
    }

    async fn confirm(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<AuthSession, ProviderError> {
        let request = SignInRequest {
            session_info: &handle.verification_id,
            code,
        };
        let response: SignInResponse = self.post("signInWithPhoneNumber", &request).await?;

        let phone = response
            .phone_number
            .unwrap_or_else(|| handle.destination.clone());
        let mut session =
            AuthSession::new(response.local_id, phone).with_new_user(response.is_new_user);
        if let Some(token) = response.id_token {
            session = session.with_id_token(token);
        }
        Ok(session)
    }

    fn provider_name(&self) -> &str {
        "IdentityToolkit"
    }
}
