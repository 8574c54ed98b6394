//! Wires the host capabilities into a ready session runtime.

use std::sync::Arc;
use std::time::Duration;

use crate::biometric::{BiometricConfig, BiometricManager, PlatformAuthenticator};
use crate::client::{ApiClient, HttpTransport};
use crate::config::EndpointConfig;
use crate::session::{Navigator, SessionOrchestrator};
use crate::storage::{
    DeviceStorageBridge, KeyValueStore, PortfolioPreference, STORAGE_BRIDGE_TIMEOUT,
    select_store_with_timeout,
};
use crate::token::TokenCache;
use crate::unlock::{Haptics, UnlockConfig, UnlockError, UnlockGate};

/// Capabilities the host shell provides.
pub struct HostCapabilities {
    /// Device storage bridge, when the host has one
    pub storage_bridge: Option<Arc<dyn DeviceStorageBridge>>,
    pub transport: Arc<dyn HttpTransport>,
    pub navigator: Arc<dyn Navigator>,
    pub authenticator: Arc<dyn PlatformAuthenticator>,
    pub haptics: Arc<dyn Haptics>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoints: EndpointConfig,
    pub bridge_timeout: Duration,
    pub biometric: BiometricConfig,
    pub unlock: UnlockConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            bridge_timeout: *STORAGE_BRIDGE_TIMEOUT,
            biometric: BiometricConfig::default(),
            unlock: UnlockConfig::default(),
        }
    }
}

/// Every long-lived component, built once per process and shared.
pub struct SessionRuntime {
    pub store: Arc<dyn KeyValueStore>,
    pub tokens: Arc<TokenCache>,
    pub client: Arc<ApiClient>,
    pub biometrics: Arc<BiometricManager>,
    pub session: Arc<SessionOrchestrator>,
    pub portfolios: PortfolioPreference,
    haptics: Arc<dyn Haptics>,
    unlock_config: UnlockConfig,
}

impl SessionRuntime {
    /// Opens a PIN gate for the current session.
    pub async fn unlock_gate(&self) -> Result<UnlockGate, UnlockError> {
        UnlockGate::open(
            self.session.clone(),
            self.biometrics.clone(),
            self.store.clone(),
            self.haptics.clone(),
            self.unlock_config.clone(),
        )
        .await
    }
}

/// Builds the runtime and restores any stored session.
///
/// A failed restore is logged and leaves the session unauthenticated; the runtime is
/// returned either way.
pub async fn init(host: HostCapabilities, config: SessionConfig) -> SessionRuntime {
    let store = select_store_with_timeout(host.storage_bridge, config.bridge_timeout);
    let tokens = Arc::new(TokenCache::new(store.clone()));
    let client = Arc::new(ApiClient::new(
        host.transport,
        tokens.clone(),
        config.endpoints,
    ));
    let biometrics = Arc::new(BiometricManager::new(
        host.authenticator,
        store.clone(),
        config.biometric,
    ));
    let session = Arc::new(SessionOrchestrator::new(
        client.clone(),
        biometrics.clone(),
        host.navigator,
    ));

    match session.restore().await {
        Ok(state) => tracing::info!("Session runtime ready: {:?}", state.auth_phase),
        Err(e) => tracing::error!("Session restore failed: {}", e),
    }

    SessionRuntime {
        portfolios: PortfolioPreference::new(store.clone()),
        store,
        tokens,
        client,
        biometrics,
        session,
        haptics: host.haptics,
        unlock_config: config.unlock,
    }
}
