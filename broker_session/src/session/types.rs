use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Local gate on top of an authenticated session. Only meaningful when authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LockPhase {
    Locked,
    Unlocked,
}

/// Identity recovered from the access token body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub client_id: String,
    pub login: String,
}

impl From<&AccessTokenClaims> for User {
    fn from(claims: &AccessTokenClaims) -> Self {
        Self {
            client_id: claims.clientid.clone(),
            login: claims.sub.clone(),
        }
    }
}

/// Process-wide session state, published to subscribers on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub auth_phase: AuthPhase,
    pub lock_phase: LockPhase,
    pub user: Option<User>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            auth_phase: AuthPhase::Unauthenticated,
            lock_phase: LockPhase::Unlocked,
            user: None,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.auth_phase == AuthPhase::Authenticated
    }

    pub fn is_locked(&self) -> bool {
        self.is_authenticated() && self.lock_phase == LockPhase::Locked
    }
}

/// Claims carried in the middle segment of the access token.
///
/// Only `clientid` and `sub` are required; the rest is informational.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub clientid: String,
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub portfolios: Option<String>,
    #[serde(default)]
    pub ein: Option<String>,
    #[serde(default)]
    pub agreements: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RefreshRequest<'a> {
    pub(super) refresh_token: &'a str,
    pub(super) context: RefreshContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RefreshContext {
    pub(super) skip_authorization: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RefreshJwtTokenResponse {
    pub(super) jwt: String,
    #[serde(default)]
    pub(super) refresh_expires_at: Option<String>,
}

/// Outcome of a successful refresh-token exchange.
#[derive(Debug, Clone)]
pub struct ExchangeResult {
    pub access_token: String,
    pub user: User,
    pub claims: AccessTokenClaims,
    /// `refreshExpiresAt` exactly as returned
    pub refresh_expires_at: Option<String>,
    /// `refreshExpiresAt` when it parses as RFC 3339
    pub refresh_expires: Option<DateTime<Utc>>,
}

/// What a protected view should do given the current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RouteDecision {
    /// Session restoration or login is still running
    Pending,
    /// Send the user to the SSO login
    RequireLogin,
    /// Send the user to the PIN/biometric gate
    RequireUnlock,
    Allow,
}
