//! Integration tests for OTP dispatch against the development provider

use std::sync::Arc;
use std::time::Duration;

use civic_core::errors::{OtpError, ProviderErrorKind};
use civic_core::repositories::{InMemoryRateLimitStore, RateLimitStore};
use civic_core::services::OtpDispatchController;
use civic_infra::auth::{create_phone_auth, DevPhoneAuth, PhoneAuthClient};
use civic_infra::config::{InfrastructureConfig, PhoneAuthBackend};
use civic_shared::{AppConfig, OtpConfig};
use tokio_test::{assert_err, assert_ok};

const TEST_NUMBER: &str = "+918122949677";

fn controller(
    provider: Arc<DevPhoneAuth>,
) -> (OtpDispatchController<DevPhoneAuth>, Arc<InMemoryRateLimitStore>) {
    let store = Arc::new(InMemoryRateLimitStore::new());
    let controller = OtpDispatchController::new(provider, store.clone(), OtpConfig::default());
    (controller, store)
}

#[tokio::test]
async fn test_complete_sign_in_with_test_number() {
    let provider = Arc::new(DevPhoneAuth::default());
    let (controller, store) = controller(provider.clone());

    // National format gets the default country code
    let handle = assert_ok!(controller.request_send("81229 49677").await);
    assert_eq!(handle.destination, TEST_NUMBER);
    assert!(assert_ok!(store.get(TEST_NUMBER).await).is_none());

    let session = assert_ok!(controller.confirm_code(&handle, "123456").await);
    assert_eq!(session.user_id, "918122949677");
    assert!(session.is_new_user);
}

#[tokio::test]
async fn test_generated_code_confirms() {
    let provider = Arc::new(DevPhoneAuth::default());
    let (controller, _) = controller(provider.clone());

    let handle = assert_ok!(controller.request_send("+919876543210").await);
    let code = provider.last_code_for("+919876543210").unwrap();

    let err = assert_err!(controller.confirm_code(&handle, "12345").await);
    assert_eq!(err, OtpError::InvalidCodeFormat { expected: 6 });

    assert_ok!(controller.confirm_code(&handle, &code).await);
}

#[tokio::test]
async fn test_repeated_failures_trip_rate_limit() {
    let provider = Arc::new(DevPhoneAuth::default());
    provider.queue_failures([ProviderErrorKind::Network; 3]);
    let (controller, _) = controller(provider.clone());

    for _ in 0..3 {
        let err = assert_err!(controller.request_send(TEST_NUMBER).await);
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Network));
    }

    let err = assert_err!(controller.request_send(TEST_NUMBER).await);
    assert_eq!(err, OtpError::RateLimited { wait_seconds: 2 });
    assert_eq!(
        err.user_message(),
        "Too many attempts. Please wait 2 seconds before trying again."
    );
    assert_eq!(provider.send_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_provider_throttling_recovers_with_backoff() {
    let provider = Arc::new(DevPhoneAuth::default());
    provider.queue_failures([ProviderErrorKind::TooManyRequests; 2]);
    let (controller, store) = controller(provider.clone());

    let start = tokio::time::Instant::now();
    assert_ok!(controller.request_send(TEST_NUMBER).await);

    assert!(start.elapsed() >= Duration::from_secs(6));
    assert_eq!(provider.send_count(), 3);
    assert!(assert_ok!(store.get(TEST_NUMBER).await).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_persistent_throttling_imposes_cooldown() {
    let provider = Arc::new(DevPhoneAuth::default());
    provider.queue_failures([ProviderErrorKind::TooManyRequests; 3]);
    let (controller, _) = controller(provider.clone());

    let err = assert_err!(controller.request_send(TEST_NUMBER).await);
    assert_eq!(err.wait_seconds(), Some(300));

    let err = assert_err!(controller.request_send(TEST_NUMBER).await);
    assert!(err.wait_seconds().unwrap() <= 300);
    assert_eq!(provider.send_count(), 3);

    assert_ok!(controller.reset(TEST_NUMBER).await);
    assert_ok!(controller.request_send(TEST_NUMBER).await);
}

#[tokio::test]
async fn test_configured_client_drives_controller() {
    let config = InfrastructureConfig::default();
    let client = assert_ok!(create_phone_auth(&config));
    assert!(matches!(client, PhoneAuthClient::Dev(_)));

    let store = Arc::new(InMemoryRateLimitStore::new());
    let controller =
        OtpDispatchController::new(Arc::new(client), store, config.app.otp.clone());
    let handle = assert_ok!(controller.request_send(TEST_NUMBER).await);
    assert_ok!(controller.confirm_code(&handle, "123456").await);
}

#[test]
fn test_dev_provider_refused_in_production() {
    let config = InfrastructureConfig {
        app: AppConfig::production(),
        phone_auth: PhoneAuthBackend::Dev,
        ..InfrastructureConfig::default()
    };
    assert!(create_phone_auth(&config).is_err());

    let config = InfrastructureConfig {
        phone_auth: PhoneAuthBackend::IdentityToolkit,
        ..InfrastructureConfig::default()
    };
    assert!(create_phone_auth(&config).is_err());
}
