use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::watch;

use super::exchange::exchange_refresh_token;
use super::redirect::{Navigator, sso_redirect_url};
use crate::biometric::BiometricManager;
use crate::client::ApiClient;
use crate::session::errors::SessionError;
use crate::session::types::{AuthPhase, ExchangeResult, LockPhase, SessionState, User};
use crate::token::TokenCache;

/// Owns the process-wide session state and drives its transitions.
///
/// State is published through a watch channel; [`SessionOrchestrator::subscribe`] gives
/// observers every transition.
pub struct SessionOrchestrator {
    client: Arc<ApiClient>,
    tokens: Arc<TokenCache>,
    biometrics: Arc<BiometricManager>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionState>,
    logging_out: AtomicBool,
    /// Bumped by every logout; an exchange started in an older epoch is discarded
    epoch: AtomicU64,
}

/// Outcome of trading a refresh token inside the orchestrator.
enum Exchanged {
    Accepted(User),
    Refused,
    /// A logout ran while the exchange was in flight
    Superseded,
}

/// Releases the logout flag when the logout finishes or its future is dropped.
struct LogoutGuard<'a>(&'a AtomicBool);

impl Drop for LogoutGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionOrchestrator {
    pub fn new(
        client: Arc<ApiClient>,
        biometrics: Arc<BiometricManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let tokens = client.tokens().clone();
        let (state, _) = watch::channel(SessionState {
            auth_phase: AuthPhase::Authenticating,
            lock_phase: LockPhase::Unlocked,
            user: None,
        });
        Self {
            client,
            tokens,
            biometrics,
            navigator,
            state,
            logging_out: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_logging_out(&self) -> bool {
        self.logging_out.load(Ordering::SeqCst)
    }

    /// Restores a session from the stored refresh token at startup.
    ///
    /// Without a stored token the session settles unauthenticated with no network call.
    /// A restored session always starts locked.
    pub async fn restore(&self) -> Result<SessionState, SessionError> {
        let refresh_token = match self.tokens.refresh_token().await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                tracing::info!("No stored refresh token, session is unauthenticated");
                self.settle_unauthenticated();
                return Ok(self.state());
            }
            Err(e) => {
                self.settle_unauthenticated();
                return Err(SessionError::from(e).log());
            }
        };

        let epoch = self.epoch.load(Ordering::SeqCst);
        self.set_phase(AuthPhase::Authenticating);
        match self.exchange_and_store(&refresh_token, false, epoch).await {
            Ok(Exchanged::Accepted(user)) => {
                tracing::info!("Session restored for login {}", user.login);
                self.settle_authenticated(user);
                Ok(self.state())
            }
            Ok(Exchanged::Superseded) => {
                tracing::info!("Logout during restore, restored session discarded");
                Ok(self.state())
            }
            Ok(Exchanged::Refused) => {
                tracing::info!("Stored refresh token was refused, clearing session");
                self.discard_tokens().await;
                self.settle_unauthenticated();
                Ok(self.state())
            }
            Err(e) => {
                self.discard_tokens().await;
                self.settle_unauthenticated();
                Err(e.log())
            }
        }
    }

    /// Completes an SSO login with the refresh token delivered to the callback.
    ///
    /// Returns `Ok(false)` when the identity service refused the token. A fresh login is
    /// always locked until the user passes the PIN gate.
    pub async fn complete_external_login(&self, refresh_token: &str) -> Result<bool, SessionError> {
        if refresh_token.is_empty() {
            return Err(SessionError::MissingCallbackToken.log());
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        self.set_phase(AuthPhase::Authenticating);
        match self.exchange_and_store(refresh_token, true, epoch).await {
            Ok(Exchanged::Accepted(user)) => {
                tracing::info!("SSO login completed for login {}", user.login);
                self.settle_authenticated(user);
                Ok(true)
            }
            Ok(Exchanged::Superseded) => {
                tracing::info!("Logout during SSO login, login discarded");
                Ok(false)
            }
            Ok(Exchanged::Refused) => {
                tracing::warn!("SSO refresh token was refused");
                self.discard_tokens().await;
                self.settle_unauthenticated();
                Ok(false)
            }
            Err(e) => {
                self.discard_tokens().await;
                self.settle_unauthenticated();
                Err(e.log())
            }
        }
    }

    /// Opens the local gate. Ignored unless the session is authenticated and locked.
    pub fn unlock(&self) -> bool {
        let unlocked = self.state.send_if_modified(|state| {
            if state.is_locked() {
                state.lock_phase = LockPhase::Unlocked;
                true
            } else {
                false
            }
        });
        if unlocked {
            tracing::info!("Session unlocked");
        } else {
            tracing::debug!("Unlock ignored, session is not locked");
        }
        unlocked
    }

    /// Sends the user to the SSO login page.
    pub fn login(&self) -> Result<(), SessionError> {
        let url = sso_redirect_url(self.client.endpoints(), false)?;
        tracing::info!("Redirecting to SSO login");
        self.navigator.assign(url.as_str());
        Ok(())
    }

    pub async fn logout(&self) -> Result<bool, SessionError> {
        self.logout_with(|| async {}).await
    }

    /// Ends the session: runs `before`, drops tokens and biometric enrollment, resets the
    /// state and sends the user to the SSO exit page.
    ///
    /// Returns `Ok(false)` without doing anything when a logout is already in progress.
    pub async fn logout_with<F, Fut>(&self, before: F) -> Result<bool, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        if self
            .logging_out
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Logout already in progress");
            return Ok(false);
        }
        let _guard = LogoutGuard(&self.logging_out);
        self.epoch.fetch_add(1, Ordering::SeqCst);

        self.teardown(before).await.map(|()| true)
    }

    async fn teardown<F, Fut>(&self, before: F) -> Result<(), SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        before().await;

        let cleared = self.tokens.clear_tokens().await;
        if let Err(e) = &cleared {
            tracing::warn!("Failed to clear stored tokens on logout: {}", e);
        }
        if let Err(e) = self.biometrics.disable().await {
            tracing::warn!("Failed to disable biometrics on logout: {}", e);
        }

        self.settle_unauthenticated();
        tracing::info!("Logged out");

        let url = sso_redirect_url(self.client.endpoints(), true)?;
        self.navigator.assign(url.as_str());

        cleared.map_err(SessionError::from)
    }

    /// Runs the exchange and stores what it returned. `persist_refresh` stores the refresh
    /// token too, for tokens that arrived from outside. Nothing is kept if a logout moved
    /// the session past `epoch` meanwhile.
    async fn exchange_and_store(
        &self,
        refresh_token: &str,
        persist_refresh: bool,
        epoch: u64,
    ) -> Result<Exchanged, SessionError> {
        let Some(ExchangeResult {
            access_token, user, ..
        }) = exchange_refresh_token(&self.client, refresh_token).await?
        else {
            return Ok(Exchanged::Refused);
        };
        if self.superseded(epoch) {
            return Ok(Exchanged::Superseded);
        }

        if persist_refresh {
            self.tokens.set_refresh_token(refresh_token).await?;
        }
        self.tokens.set_access_token(&access_token).await?;

        // A logout that cleared tokens while they were being written wins
        if self.superseded(epoch) {
            self.discard_tokens().await;
            return Ok(Exchanged::Superseded);
        }
        Ok(Exchanged::Accepted(user))
    }

    fn superseded(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) != epoch
    }

    async fn discard_tokens(&self) {
        if let Err(e) = self.tokens.clear_tokens().await {
            tracing::warn!("Failed to clear stored tokens: {}", e);
        }
    }

    fn set_phase(&self, phase: AuthPhase) {
        self.state.send_modify(|state| state.auth_phase = phase);
    }

    fn settle_authenticated(&self, user: User) {
        self.state.send_replace(SessionState {
            auth_phase: AuthPhase::Authenticated,
            lock_phase: LockPhase::Locked,
            user: Some(user),
        });
    }

    fn settle_unauthenticated(&self) {
        self.state.send_replace(SessionState::default());
    }
}
