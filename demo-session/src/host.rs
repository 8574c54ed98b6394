//! Host capabilities for running the session library on a plain server.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use broker_session::{DeviceStorageBridge, Navigator, StorageError};

/// Device storage emulated with a JSON file, so a session survives a restart.
pub(crate) struct FileBridge {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileBridge {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::Bridge(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StorageError::Bridge(e.to_string())),
        }
    }

    async fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string_pretty(entries).map_err(|e| StorageError::Bridge(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| StorageError::Bridge(e.to_string()))
    }

    async fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut HashMap<String, String>) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        f(&mut entries);
        self.save(&entries).await
    }
}

#[async_trait]
impl DeviceStorageBridge for FileBridge {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
        .await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.update(HashMap::clear).await
    }
}

/// Remembers where the session wants the browser to go; handlers turn it into a redirect.
#[derive(Default)]
pub(crate) struct RedirectSlot {
    target: Mutex<Option<String>>,
}

impl RedirectSlot {
    pub(crate) fn take(&self) -> Option<String> {
        self.target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Navigator for RedirectSlot {
    fn assign(&self, url: &str) {
        tracing::debug!("Navigation requested to {}", url);
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(url.to_string());
    }
}
