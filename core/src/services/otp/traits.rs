//! Collaborator traits for the OTP dispatch controller

use async_trait::async_trait;

use crate::domain::{AuthSession, ConfirmationHandle};
use crate::errors::ProviderError;

/// Phone-auth provider that sends and confirms one-time codes
///
/// Implementations classify their native failures into
/// [`ProviderErrorKind`](crate::errors::ProviderErrorKind) before returning.
#[async_trait]
pub trait PhoneAuthProvider: Send + Sync {
    /// Send a code to `destination` (E.164)
    ///
    /// # Returns
    /// * `Ok(ConfirmationHandle)` - The provider accepted the send
    /// * `Err(ProviderError)` - The send was refused or failed
    async fn send_code(&self, destination: &str) -> Result<ConfirmationHandle, ProviderError>;

    /// Confirm a code previously sent under `handle`
    async fn confirm(
        &self,
        handle: &ConfirmationHandle,
        code: &str,
    ) -> Result<AuthSession, ProviderError>;

    /// Provider name for logs
    fn provider_name(&self) -> &str;
}
