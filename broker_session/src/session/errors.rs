use thiserror::Error;

use crate::client::ApiError;
use crate::storage::StorageError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The identity provider issued an access token whose body cannot be decoded.
    /// This is a contract violation, not an expired or wrong credential.
    #[error("Malformed access token: {0}")]
    MalformedToken(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The SSO callback arrived without a `refreshToken` parameter
    #[error("Refresh token missing from SSO callback")]
    MissingCallbackToken,

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl SessionError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::MalformedToken(msg) => tracing::error!("Malformed access token: {}", msg),
            Self::Storage(err) => tracing::error!("Session storage error: {}", err),
            Self::Api(err) => tracing::error!("Session API error: {}", err),
            Self::MissingCallbackToken => tracing::warn!("Refresh token missing from SSO callback"),
            Self::Url(msg) => tracing::error!("Invalid URL: {}", msg),
        }
        self
    }
}

impl From<url::ParseError> for SessionError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err.to_string())
    }
}
