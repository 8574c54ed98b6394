use http::StatusCode;
use thiserror::Error;

use crate::session::SessionError;
use crate::storage::StorageError;

/// Errors surfaced by the HTTP request pipeline.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// Non-2xx response after the one-shot re-authentication retry
    #[error("API Error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    /// The request never produced a response (DNS, TLS, connection reset, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request or response body could not be converted
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The identity provider returned an access token that cannot be decoded
    #[error("Malformed access token: {0}")]
    MalformedToken(String),

    #[error("Invalid header: {0}")]
    Header(String),

    #[error("Token refresh error: {0}")]
    Refresh(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MalformedToken(msg) => Self::MalformedToken(msg),
            SessionError::Storage(err) => Self::Storage(err),
            SessionError::Api(err) => err,
            other => Self::Refresh(other.to_string()),
        }
    }
}
