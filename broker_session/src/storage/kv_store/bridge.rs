use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::storage::errors::StorageError;

use super::types::{BridgedStore, DeviceStorageBridge, InMemoryStore, KeyValueStore};

impl BridgedStore {
    pub fn new(bridge: Arc<dyn DeviceStorageBridge>, timeout: Duration) -> Self {
        tracing::info!(
            "Creating bridged key-value store with {}ms bridge timeout",
            timeout.as_millis()
        );
        Self {
            bridge,
            fallback: InMemoryStore::new(),
            timeout,
        }
    }

    /// Runs a bridge call under the timeout. Failures are logged and reported as `None`.
    async fn guarded<T, F>(&self, op: &'static str, key: &str, call: F) -> Option<T>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                tracing::warn!(op, key, "Device storage bridge failed, using fallback: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    op,
                    key,
                    "Device storage bridge timed out after {}ms, using fallback",
                    self.timeout.as_millis()
                );
                None
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for BridgedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let bridged = self
            .guarded("get", key, self.bridge.get_item(key))
            .await
            .flatten()
            .filter(|value| !value.is_empty());

        match bridged {
            Some(value) => {
                // Keep the fallback home in step with what the bridge knows
                self.fallback.set(key, &value).await?;
                Ok(Some(value))
            }
            None => self.fallback.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.fallback.set(key, value).await?;
        self.guarded("set", key, self.bridge.set_item(key, value))
            .await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.fallback.remove(key).await?;
        self.guarded("remove", key, self.bridge.remove_item(key))
            .await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.fallback.clear().await?;
        self.guarded("clear", "*", self.bridge.clear()).await;
        Ok(())
    }
}
