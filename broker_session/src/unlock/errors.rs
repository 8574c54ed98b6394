use thiserror::Error;

use crate::session::SessionError;
use crate::storage::StorageError;

#[derive(Debug, Error, Clone)]
pub enum UnlockError {
    #[error("Not a PIN digit: {0:?}")]
    InvalidDigit(char),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}
