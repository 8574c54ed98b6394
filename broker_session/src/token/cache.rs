use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::storage::{ACCESS_TOKEN_KEY, KeyValueStore, REFRESH_TOKEN_KEY, StorageError};

/// Memory slot for one token.
///
/// `Unloaded` means the durable store has not been asked yet; `Loaded(None)` means it was
/// asked (or cleared) and holds nothing.
#[derive(Debug, Clone)]
enum Slot {
    Unloaded,
    Loaded(Option<String>),
}

/// Memoized access to the access and refresh tokens.
///
/// Writes update the memory slot before the durable store is awaited, so a write that has
/// resolved is seen by every later read, including reads that were already waiting on the
/// store when the write happened.
pub struct TokenCache {
    store: Arc<dyn KeyValueStore>,
    access: Mutex<Slot>,
    refresh: Mutex<Slot>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TokenCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            access: Mutex::new(Slot::Unloaded),
            refresh: Mutex::new(Slot::Unloaded),
        }
    }

    pub async fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.read(&self.access, ACCESS_TOKEN_KEY).await
    }

    pub async fn set_access_token(&self, token: &str) -> Result<(), StorageError> {
        self.write(&self.access, ACCESS_TOKEN_KEY, Some(token)).await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.read(&self.refresh, REFRESH_TOKEN_KEY).await
    }

    pub async fn set_refresh_token(&self, token: &str) -> Result<(), StorageError> {
        self.write(&self.refresh, REFRESH_TOKEN_KEY, Some(token))
            .await
    }

    /// Forgets both tokens. Both slots end up loaded-empty, never unloaded, so nothing
    /// left behind in the durable store can come back.
    pub async fn clear_tokens(&self) -> Result<(), StorageError> {
        *lock(&self.access) = Slot::Loaded(None);
        *lock(&self.refresh) = Slot::Loaded(None);
        tracing::debug!("Cleared cached access and refresh tokens");

        self.store.remove(ACCESS_TOKEN_KEY).await?;
        self.store.remove(REFRESH_TOKEN_KEY).await?;
        Ok(())
    }

    async fn read(&self, slot: &Mutex<Slot>, key: &str) -> Result<Option<String>, StorageError> {
        {
            let guard = lock(slot);
            if let Slot::Loaded(value) = &*guard {
                return Ok(value.clone());
            }
        }

        let stored = self.store.get(key).await?;

        let mut guard = lock(slot);
        // A write or clear may have landed while we were waiting on the store
        if let Slot::Loaded(current) = &*guard {
            return Ok(current.clone());
        }
        *guard = Slot::Loaded(stored.clone());
        Ok(stored)
    }

    async fn write(
        &self,
        slot: &Mutex<Slot>,
        key: &str,
        value: Option<&str>,
    ) -> Result<(), StorageError> {
        *lock(slot) = Slot::Loaded(value.map(str::to_string));

        match value {
            Some(value) => self.store.set(key, value).await,
            None => self.store.remove(key).await,
        }
    }
}
