//! Development phone-auth provider
//!
//! Logs codes instead of sending them. The configured test number always
//! receives the fixed test code, so sign-in can be exercised without an
//! SMS round trip. Failures can be queued to rehearse provider throttling.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use civic_core::domain::{AuthSession, ConfirmationHandle};
use civic_core::errors::{ProviderError, ProviderErrorKind};
use civic_core::services::PhoneAuthProvider;
use civic_shared::phone::{is_valid_e164, mask_phone_number, normalize_phone_number, user_id_from_phone};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{info, warn};
use uuid::Uuid;

/// Test number and code honoured by [`DevPhoneAuth`]
#[derive(Debug, Clone)]
pub struct DevAuthConfig {
    pub test_number: String,
    pub test_code: String,
}

impl Default for DevAuthConfig {
    fn default() -> Self {
        Self {
            test_number: "+918122949677".to_string(),
            test_code: "123456".to_string(),
        }
    }
}

impl DevAuthConfig {
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            test_number: var("DEV_AUTH_TEST_NUMBER")
                .map(|n| normalize_phone_number(&n))
                .unwrap_or(defaults.test_number),
            test_code: var("DEV_AUTH_TEST_CODE").unwrap_or(defaults.test_code),
        }
    }
}

struct IssuedCode {
    destination: String,
    code: String,
}

/// In-process phone-auth provider for development and tests
pub struct DevPhoneAuth {
    config: DevAuthConfig,
    issued: Mutex<HashMap<String, IssuedCode>>,
    latest_codes: Mutex<HashMap<String, String>>,
    known_users: Mutex<HashSet<String>>,
    queued_failures: Mutex<VecDeque<ProviderErrorKind>>,
    send_count: Mutex<u32>,
}

impl DevPhoneAuth {
    pub fn new(config: DevAuthConfig) -> Self {
        Self {
            config,
            issued: Mutex::new(HashMap::new()),
            latest_codes: Mutex::new(HashMap::new()),
            known_users: Mutex::new(HashSet::new()),
            queued_failures: Mutex::new(VecDeque::new()),
            send_count: Mutex::new(0),
        }
    }

    /// Make the next sends fail with `kinds`, in order
    pub fn queue_failures<I>(&self, kinds: I)
    where
        I: IntoIterator<Item = ProviderErrorKind>,
    {
        lock(&self.queued_failures).extend(kinds);
    }

    /// Code most recently issued to `destination`
    pub fn last_code_for(&self, destination: &str) -> Option<String> {
        lock(&self.latest_codes)
            .get(&normalize_phone_number(destination))
            .cloned()
    }

    /// Number of send attempts received, including failed ones
    pub fn send_count(&self) -> u32 {
        *lock(&self.send_count)
    }

    fn code_for(&self, destination: &str) -> String {
        if destination == self.config.test_number {
            return self.config.test_code.clone();
        }
        generate_code()
    }
}

impl Default for DevPhoneAuth {
    fn default() -> Self {
        Self::new(DevAuthConfig::default())
    }
}

/// Random 6-digit code from the OS CSPRNG
fn generate_code() -> String {
    let mut bytes = [0u8; 4];
    OsRng.fill_bytes(&mut bytes);
    format!("{:06}", u32::from_le_bytes(bytes) % 1_000_000)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl PhoneAuthProvider for DevPhoneAuth {
    async fn send_code(&self, destination: &str) -> Result<ConfirmationHandle, ProviderError> {
        *lock(&self.send_count) += 1;

        if let Some(kind) = lock(&self.queued_failures).pop_front() {
            warn!(
                phone = %mask_phone_number(destination),
                kind = %kind,
                "Dev phone auth failing on request"
            );
            return Err(ProviderError::new(kind, format!("dev provider: {}", kind)));
        }

        let destination = normalize_phone_number(destination);
        if !is_valid_e164(&destination) {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidDestination,
                "Phone number must be in E.164 format (e.g., +919876543210)",
            ));
        }

        let code = self.code_for(&destination);
        let verification_id = Uuid::new_v4().to_string();
        info!(
            phone = %mask_phone_number(&destination),
            code = %code,
            verification_id = %verification_id,
            "Dev phone auth issued code"
        );

        lock(&self.latest_codes).insert(destination.clone(), code.clone());
        lock(&self.issued).insert(
            verification_id.clone(),
            IssuedCode {
                destination: destination.clone(),
                code,
            },
        );
        Ok(ConfirmationHandle::new(verification_id, destination))
    }

    async fn confirm(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<AuthSession, ProviderError> {
        let mut issued = lock(&self.issued);
        let expected = issued.get(&handle.verification_id).ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::CodeExpired, "Unknown or used session")
        })?;

        if expected.code != code {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidCode,
                "Code does not match",
            ));
        }

        let destination = expected.destination.clone();
        issued.remove(&handle.verification_id);
        drop(issued);

        let user_id = user_id_from_phone(&destination).unwrap_or_default();
        let is_new_user = lock(&self.known_users).insert(user_id.clone());
        Ok(AuthSession::new(format!("dev-{}", user_id), destination)
            .with_new_user(is_new_user))
    }

    fn provider_name(&self) -> &str {
        "Dev"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_test_number_gets_fixed_code() {
        let provider = DevPhoneAuth::default();
        let handle = provider.send_code("+91 81229 49677").await.unwrap();
        assert_eq!(handle.destination, "+918122949677");
        assert_eq!(provider.last_code_for("+918122949677").as_deref(), Some("123456"));

        let session = provider.confirm(&handle, "123456").await.unwrap();
        assert_eq!(session.user_id, "918122949677");
        assert!(session.is_new_user);
    }

    #[tokio::test]
    async fn test_issued_code_is_six_digits_and_single_use() {
        let provider = DevPhoneAuth::default();
        let handle = provider.send_code("+919876543210").await.unwrap();
        let code = provider.last_code_for("+919876543210").unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| b.is_ascii_digit()));

        provider.confirm(&handle, &code).await.unwrap();
        let err = provider.confirm(&handle, &code).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::CodeExpired);
    }

    #[test]
    fn test_generated_codes_are_padded_digits() {
        let codes: HashSet<String> = (0..50).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
        for code in &codes {
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_session() {
        let provider = DevPhoneAuth::default();
        let handle = provider.send_code("+918122949677").await.unwrap();

        let err = provider.confirm(&handle, "000000").await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidCode);
        assert!(provider.confirm(&handle, "123456").await.is_ok());
    }

    #[tokio::test]
    async fn test_returning_user_is_not_new() {
        let provider = DevPhoneAuth::default();
        for expected_new in [true, false] {
            let handle = provider.send_code("+918122949677").await.unwrap();
            let session = provider.confirm(&handle, "123456").await.unwrap();
            assert_eq!(session.is_new_user, expected_new);
        }
    }

    #[tokio::test]
    async fn test_queued_failures_run_in_order() {
        let provider = DevPhoneAuth::default();
        provider.queue_failures([
            ProviderErrorKind::TooManyRequests,
            ProviderErrorKind::Network,
        ]);

        let first = provider.send_code("+918122949677").await.unwrap_err();
        let second = provider.send_code("+918122949677").await.unwrap_err();
        assert_eq!(first.kind, ProviderErrorKind::TooManyRequests);
        assert_eq!(second.kind, ProviderErrorKind::Network);
        assert!(provider.send_code("+918122949677").await.is_ok());
        assert_eq!(provider.send_count(), 3);
    }

    #[tokio::test]
    async fn test_rejects_non_e164() {
        let provider = DevPhoneAuth::default();
        let err = provider.send_code("8122949677").await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidDestination);
    }

    #[test]
    fn test_config_from_vars() {
        let config = DevAuthConfig::from_vars(|key| match key {
            "DEV_AUTH_TEST_NUMBER" => Some("+1 555 010 9999".to_string()),
            _ => None,
        });
        assert_eq!(config.test_number, "+15550109999");
        assert_eq!(config.test_code, "123456");
    }
}
