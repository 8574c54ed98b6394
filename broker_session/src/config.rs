//! Central endpoint configuration for the broker_session crate

use std::env;
use std::sync::LazyLock;

/// Base URL for business API calls issued with a relative path.
pub static BROKER_API_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("BROKER_API_URL").unwrap_or_else(|_| "https://api.alor.ru".to_string())
});

/// Base URL of the identity service hosting the refresh-token exchange.
pub static BROKER_USER_DATA_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("BROKER_USER_DATA_URL").unwrap_or_else(|_| "https://lk-api.alor.ru".to_string())
});

/// External SSO login page.
pub static BROKER_SSO_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("BROKER_SSO_URL").unwrap_or_else(|_| "https://login.alor.ru".to_string())
});

/// Where the SSO page sends the user back with a `refreshToken` query parameter.
pub static BROKER_SSO_CALLBACK_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("BROKER_SSO_CALLBACK_URL")
        .unwrap_or_else(|_| "http://localhost:3001/auth/sso".to_string())
});

pub static BROKER_SSO_SCOPE: LazyLock<String> =
    LazyLock::new(|| env::var("BROKER_SSO_SCOPE").unwrap_or_else(|_| "MiniApp".to_string()));

/// Endpoints used by the HTTP pipeline and the session orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub api_url: String,
    pub user_data_url: String,
    pub sso_url: String,
    pub callback_url: String,
    pub scope: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_url: BROKER_API_URL.clone(),
            user_data_url: BROKER_USER_DATA_URL.clone(),
            sso_url: BROKER_SSO_URL.clone(),
            callback_url: BROKER_SSO_CALLBACK_URL.clone(),
            scope: BROKER_SSO_SCOPE.clone(),
        }
    }
}

impl EndpointConfig {
    /// Resolves a request URL: absolute URLs pass through, relative ones are joined to `api_url`.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.api_url.trim_end_matches('/'), url)
        }
    }

    pub fn refresh_endpoint(&self) -> String {
        format!(
            "{}/auth/actions/refresh",
            self.user_data_url.trim_end_matches('/')
        )
    }
}
