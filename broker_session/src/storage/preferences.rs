use std::sync::Arc;

use super::errors::StorageError;
use super::keys::LAST_PORTFOLIO_KEY;
use super::kv_store::KeyValueStore;

/// Remembers which portfolio the user last selected.
pub struct PortfolioPreference {
    store: Arc<dyn KeyValueStore>,
}

impl PortfolioPreference {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn selected(&self) -> Result<Option<String>, StorageError> {
        self.store.get(LAST_PORTFOLIO_KEY).await
    }

    pub async fn select(&self, portfolio: &str) -> Result<(), StorageError> {
        self.store.set(LAST_PORTFOLIO_KEY, portfolio).await
    }

    /// Picks the portfolio to show from a freshly loaded list: the saved one if it is
    /// still offered, otherwise the first one.
    pub async fn resolve<'a>(
        &self,
        available: &'a [String],
    ) -> Result<Option<&'a String>, StorageError> {
        let saved = self.selected().await?;
        let found = saved.and_then(|id| available.iter().find(|p| **p == id));
        Ok(found.or_else(|| available.first()))
    }
}
