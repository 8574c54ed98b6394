use std::sync::{Arc, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

use super::request::{ApiClient, RefreshCell};
use crate::client::errors::ApiError;
use crate::session::exchange_refresh_token;

impl ApiClient {
    /// Shared refresh procedure used on 401.
    ///
    /// Trades the stored refresh token for a new access token and stores it. Returns
    /// `Ok(false)` when there is no refresh token or the exchange was refused. Callers that
    /// arrive while a refresh is running wait for that refresh instead of starting another;
    /// the slot is emptied once it settles so a later 401 starts a fresh attempt.
    pub async fn refresh_access_token(&self) -> Result<bool, ApiError> {
        let cell = {
            let mut slot = self.lock_refresh_slot();
            match slot.as_ref() {
                Some(cell) => {
                    tracing::debug!("Joining in-flight access token refresh");
                    cell.clone()
                }
                None => {
                    let cell: RefreshCell = Arc::new(OnceCell::new());
                    *slot = Some(cell.clone());
                    cell
                }
            }
        };

        let outcome = cell.get_or_init(|| self.run_refresh()).await.clone();

        {
            let mut slot = self.lock_refresh_slot();
            if slot
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &cell))
            {
                *slot = None;
            }
        }

        outcome
    }

    async fn run_refresh(&self) -> Result<bool, ApiError> {
        let Some(refresh_token) = self.tokens.refresh_token().await? else {
            tracing::warn!("Access token rejected and no refresh token is stored");
            return Ok(false);
        };

        match exchange_refresh_token(self, &refresh_token).await? {
            Some(result) => {
                self.tokens.set_access_token(&result.access_token).await?;
                tracing::info!("Access token refreshed for login {}", result.user.login);
                Ok(true)
            }
            None => {
                tracing::warn!("Refresh token exchange was refused");
                Ok(false)
            }
        }
    }

    fn lock_refresh_slot(&self) -> MutexGuard<'_, Option<RefreshCell>> {
        self.refresh_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
