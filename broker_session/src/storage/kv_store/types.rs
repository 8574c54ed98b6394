use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

/// In-process store used as the fallback home of every entry.
pub struct InMemoryStore {
    pub(super) entries: Mutex<HashMap<String, String>>,
}

/// Store that prefers the host device-storage bridge and always keeps a copy in the fallback.
pub struct BridgedStore {
    pub(super) bridge: Arc<dyn DeviceStorageBridge>,
    pub(super) fallback: InMemoryStore,
    pub(super) timeout: Duration,
}

/// Durable key-value storage seen by the rest of the crate.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Get a value. `None` only when no home holds the key.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Put a value, overwriting any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every value.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Asynchronous storage capability provided by the host shell.
///
/// Implementations may hang, fail, or silently do nothing; callers bound every call
/// with a timeout and never rely on the bridge alone.
#[async_trait]
pub trait DeviceStorageBridge: Send + Sync + 'static {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}
