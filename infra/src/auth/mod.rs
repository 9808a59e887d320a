//! Phone-auth provider module
//!
//! - `identity_toolkit` - Identity Toolkit REST provider
//! - `dev` - development provider with a test-number bypass
//! - `phone` - destination parsing shared by the providers

pub mod dev;
pub mod identity_toolkit;
pub mod phone;

use async_trait::async_trait;
use civic_core::domain::{AuthSession, ConfirmationHandle};
use civic_core::errors::ProviderError;
use civic_core::services::PhoneAuthProvider;
use tracing::info;

pub use dev::{DevAuthConfig, DevPhoneAuth};
pub use identity_toolkit::{IdentityToolkitConfig, IdentityToolkitPhoneAuth};

use crate::config::{InfrastructureConfig, PhoneAuthBackend};
use crate::InfrastructureError;

/// Provider selected at startup from configuration
pub enum PhoneAuthClient {
    IdentityToolkit(IdentityToolkitPhoneAuth),
    Dev(DevPhoneAuth),
}

#[async_trait]
impl PhoneAuthProvider for PhoneAuthClient {
    async fn send_code(&self, destination: &str) -> Result<ConfirmationHandle, ProviderError> {
        match self {
            Self::IdentityToolkit(provider) => provider.send_code(destination).await,
            Self::Dev(provider) => provider.send_code(destination).await,
        }
    }

    async fn confirm(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<AuthSession, ProviderError> {
        match self {
            Self::IdentityToolkit(provider) => provider.confirm(handle, code).await,
            Self::Dev(provider) => provider.confirm(handle, code).await,
        }
    }

    fn provider_name(&self) -> &str {
        match self {
            Self::IdentityToolkit(provider) => provider.provider_name(),
            Self::Dev(provider) => provider.provider_name(),
        }
    }
}

/// Create the phone-auth provider named by `config`
pub fn create_phone_auth(
    config: &InfrastructureConfig,
) -> Result<PhoneAuthClient, InfrastructureError> {
    let client = match config.phone_auth {
        PhoneAuthBackend::IdentityToolkit => {
            let settings = config.identity_toolkit.clone().ok_or_else(|| {
                InfrastructureError::Config(
                    "Identity Toolkit selected but IDENTITY_TOOLKIT_API_KEY is not set".to_string(),
                )
            })?;
            PhoneAuthClient::IdentityToolkit(IdentityToolkitPhoneAuth::new(settings)?)
        }
        PhoneAuthBackend::Dev => {
            if config.app.environment.is_production() {
                return Err(InfrastructureError::Config(
                    "Dev phone auth cannot be used in production".to_string(),
                ));
            }
            PhoneAuthClient::Dev(DevPhoneAuth::new(config.dev_auth.clone()))
        }
    };

    info!(provider = client.provider_name(), "Phone auth provider created");
    Ok(client)
}
