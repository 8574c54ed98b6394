use std::future::Future;
use std::sync::Arc;

use super::config::BiometricConfig;
use super::errors::BiometricError;
use super::platform::PlatformAuthenticator;
use super::types::{
    AllowCredential, AuthenticatorSelection, CredentialCreationOptions, CredentialRequestOptions,
    PubKeyCredParam, PublicKeyCredentialUserEntity, RelyingParty,
};
use crate::storage::{BIOMETRIC_CREDENTIAL_KEY, BIOMETRIC_ENABLED_KEY, KeyValueStore};
use crate::utils::{base64url_decode, base64url_encode, gen_random_bytes};

const CHALLENGE_LEN: usize = 32;
const USER_ID_LEN: usize = 16;

/// Local biometric unlock on top of the platform authenticator.
///
/// Enrollment stores only the credential id and an enabled flag. Every ceremony is
/// best effort: failures and cancellations are logged and reported as `false`.
pub struct BiometricManager {
    authenticator: Arc<dyn PlatformAuthenticator>,
    store: Arc<dyn KeyValueStore>,
    config: BiometricConfig,
}

impl BiometricManager {
    pub fn new(
        authenticator: Arc<dyn PlatformAuthenticator>,
        store: Arc<dyn KeyValueStore>,
        config: BiometricConfig,
    ) -> Self {
        Self {
            authenticator,
            store,
            config,
        }
    }

    pub async fn is_available(&self) -> bool {
        let platform = self.authenticator.platform();
        if !platform.allows_biometrics() {
            tracing::debug!("Biometrics skipped on platform {:?}", platform);
            return false;
        }

        if !self.authenticator.is_supported() {
            tracing::debug!("Platform credential API not supported");
            return false;
        }

        match self
            .authenticator
            .is_user_verifying_platform_authenticator_available()
            .await
        {
            Ok(available) => {
                tracing::debug!("Platform authenticator available: {}", available);
                available
            }
            Err(e) => {
                tracing::warn!("Error checking biometric availability: {}", e);
                false
            }
        }
    }

    pub async fn is_enrolled(&self) -> bool {
        let credential_id = self.store.get(BIOMETRIC_CREDENTIAL_KEY).await;
        let enabled = self.store.get(BIOMETRIC_ENABLED_KEY).await;
        match (credential_id, enabled) {
            (Ok(Some(id)), Ok(Some(flag))) => !id.is_empty() && flag == "true",
            _ => false,
        }
    }

    /// Registers a platform credential and marks biometrics enabled.
    pub async fn enroll(&self) -> bool {
        match self.try_enroll().await {
            Ok(enrolled) => enrolled,
            Err(BiometricError::NotAllowed) => {
                tracing::info!("User cancelled biometric enrollment");
                false
            }
            Err(e) => {
                tracing::warn!("Biometric enrollment failed: {}", e);
                false
            }
        }
    }

    /// Runs an assertion against the enrolled credential.
    pub async fn authenticate(&self) -> bool {
        match self.try_authenticate().await {
            Ok(verified) => verified,
            Err(BiometricError::NotAllowed) => {
                tracing::info!("User cancelled biometric authentication");
                false
            }
            Err(e) => {
                tracing::warn!("Biometric authentication failed: {}", e);
                false
            }
        }
    }

    pub async fn disable(&self) -> Result<(), BiometricError> {
        self.store.remove(BIOMETRIC_CREDENTIAL_KEY).await?;
        self.store.remove(BIOMETRIC_ENABLED_KEY).await?;
        tracing::info!("Biometric unlock disabled");
        Ok(())
    }

    pub fn creation_options(&self) -> Result<CredentialCreationOptions, BiometricError> {
        let public_key = |alg| PubKeyCredParam {
            type_: "public-key".to_string(),
            alg,
        };

        Ok(CredentialCreationOptions {
            challenge: base64url_encode(&gen_random_bytes(CHALLENGE_LEN)?),
            rp: RelyingParty {
                name: self.config.rp_name.clone(),
                id: self.config.rp_id.clone(),
            },
            user: PublicKeyCredentialUserEntity {
                id: base64url_encode(&gen_random_bytes(USER_ID_LEN)?),
                name: "max-user".to_string(),
                display_name: "Max App User".to_string(),
            },
            // ES256, RS256
            pub_key_cred_params: vec![public_key(-7), public_key(-257)],
            authenticator_selection: AuthenticatorSelection {
                authenticator_attachment: "platform".to_string(),
                user_verification: "required".to_string(),
                resident_key: "preferred".to_string(),
            },
            timeout: self.timeout_millis(),
            attestation: "none".to_string(),
        })
    }

    pub fn request_options(
        &self,
        credential_id: &str,
    ) -> Result<CredentialRequestOptions, BiometricError> {
        // Reject a corrupted id before showing a prompt that cannot succeed
        base64url_decode(credential_id)?;

        Ok(CredentialRequestOptions {
            challenge: base64url_encode(&gen_random_bytes(CHALLENGE_LEN)?),
            rp_id: self.config.rp_id.clone(),
            allow_credentials: vec![AllowCredential {
                type_: "public-key".to_string(),
                id: credential_id.to_string(),
                transports: vec!["internal".to_string()],
            }],
            user_verification: "required".to_string(),
            timeout: self.timeout_millis(),
        })
    }

    async fn try_enroll(&self) -> Result<bool, BiometricError> {
        let options = self.creation_options()?;
        let credential = self
            .bounded(self.authenticator.create_credential(&options))
            .await?;

        let Some(credential) = credential else {
            tracing::warn!("Platform returned no credential from create");
            return Ok(false);
        };

        self.store
            .set(
                BIOMETRIC_CREDENTIAL_KEY,
                &base64url_encode(&credential.raw_id),
            )
            .await?;
        self.store.set(BIOMETRIC_ENABLED_KEY, "true").await?;

        tracing::info!("Biometric enrollment successful");
        Ok(true)
    }

    async fn try_authenticate(&self) -> Result<bool, BiometricError> {
        let credential_id = match self.store.get(BIOMETRIC_CREDENTIAL_KEY).await? {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::warn!("No stored biometric credential id");
                return Ok(false);
            }
        };

        let options = self.request_options(&credential_id)?;
        let assertion = self
            .bounded(self.authenticator.get_assertion(&options))
            .await?;

        match assertion {
            Some(_) => {
                tracing::info!("Biometric authentication successful");
                Ok(true)
            }
            None => {
                tracing::warn!("Platform returned no assertion");
                Ok(false)
            }
        }
    }

    /// Bounds a platform ceremony by the configured timeout.
    async fn bounded<T>(
        &self,
        ceremony: impl Future<Output = Result<T, BiometricError>>,
    ) -> Result<T, BiometricError> {
        tokio::time::timeout(self.config.timeout, ceremony)
            .await
            .map_err(|_| BiometricError::Timeout)?
    }

    fn timeout_millis(&self) -> u32 {
        u32::try_from(self.config.timeout.as_millis()).unwrap_or(u32::MAX)
    }
}
