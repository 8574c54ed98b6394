use async_trait::async_trait;

use super::errors::BiometricError;
use super::types::{
    CredentialCreationOptions, CredentialRequestOptions, HostPlatform, PlatformAssertion,
    PlatformCredential,
};

/// Host-provided platform authenticator (fingerprint, face recognition).
///
/// A user cancellation is reported as [`BiometricError::NotAllowed`]. `Ok(None)` means the
/// platform finished the ceremony without producing a credential.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync + 'static {
    fn platform(&self) -> HostPlatform;

    /// Whether the credential API exists at all on this host.
    fn is_supported(&self) -> bool;

    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, BiometricError>;

    async fn create_credential(
        &self,
        options: &CredentialCreationOptions,
    ) -> Result<Option<PlatformCredential>, BiometricError>;

    async fn get_assertion(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<PlatformAssertion>, BiometricError>;
}

/// Authenticator for hosts without a credential API. Every ceremony is unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailablePlatform;

#[async_trait]
impl PlatformAuthenticator for UnavailablePlatform {
    fn platform(&self) -> HostPlatform {
        HostPlatform::Unknown
    }

    fn is_supported(&self) -> bool {
        false
    }

    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, BiometricError> {
        Ok(false)
    }

    async fn create_credential(
        &self,
        _options: &CredentialCreationOptions,
    ) -> Result<Option<PlatformCredential>, BiometricError> {
        Err(BiometricError::Unsupported)
    }

    async fn get_assertion(
        &self,
        _options: &CredentialRequestOptions,
    ) -> Result<Option<PlatformAssertion>, BiometricError> {
        Err(BiometricError::Unsupported)
    }
}
