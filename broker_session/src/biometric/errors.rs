use thiserror::Error;

use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum BiometricError {
    /// The user dismissed the prompt or the platform refused it
    #[error("Biometric prompt was cancelled or not allowed")]
    NotAllowed,

    #[error("Biometric authentication is not supported on this device")]
    Unsupported,

    #[error("Biometric prompt timed out")]
    Timeout,

    #[error("Platform authenticator error: {0}")]
    Platform(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
