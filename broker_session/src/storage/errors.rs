use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Storage(String),

    /// The host device-storage bridge rejected or failed a call
    #[error("Device storage bridge error: {0}")]
    Bridge(String),
}
