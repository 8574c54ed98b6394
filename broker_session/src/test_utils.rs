//! Test utilities shared by the unit tests of every module
//!
//! Scripted fakes for each host capability (storage bridge, HTTP transport, navigation,
//! platform authenticator, haptics) plus a builder for synthetic access tokens.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use http::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use crate::biometric::{
    BiometricError, CredentialCreationOptions, CredentialRequestOptions, HostPlatform,
    PlatformAssertion, PlatformAuthenticator, PlatformCredential,
};
use crate::client::{ApiError, HttpRequest, HttpResponse, HttpTransport};
use crate::config::EndpointConfig;
use crate::session::Navigator;
use crate::storage::{DeviceStorageBridge, InMemoryStore, KeyValueStore, StorageError};
use crate::unlock::Haptics;

/// Loads `.env_test` (falling back to `.env`) once per test process.
pub(crate) fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });
}

pub(crate) fn test_endpoints() -> EndpointConfig {
    EndpointConfig {
        api_url: "https://api.example.test/".to_string(),
        user_data_url: "https://id.example.test".to_string(),
        sso_url: "https://login.example.test".to_string(),
        callback_url: "https://app.example.test/auth/sso".to_string(),
        scope: "MiniApp".to_string(),
    }
}

/// Builds an unsigned access token whose body uses the padded standard alphabet.
pub(crate) fn make_access_token(clientid: &str, sub: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let claims = serde_json::json!({
        "clientid": clientid,
        "sub": sub,
        "exp": 4_102_444_800_i64,
        "portfolios": "D1234 7501ABC",
        "ein": "1234567890",
        "agreements": "A1",
    });
    let body = STANDARD.encode(claims.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

pub(crate) fn refresh_body(jwt: &str) -> String {
    serde_json::json!({
        "jwt": jwt,
        "refreshExpiresAt": "2030-01-01T00:00:00Z",
    })
    .to_string()
}

mod bridges {
    use super::*;

    /// Never answers.
    pub(crate) struct HangingBridge;

    #[async_trait]
    impl DeviceStorageBridge for HangingBridge {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            std::future::pending().await
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            std::future::pending().await
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            std::future::pending().await
        }

        async fn clear(&self) -> Result<(), StorageError> {
            std::future::pending().await
        }
    }

    /// Errors on every call.
    pub(crate) struct FailingBridge;

    fn bridge_down() -> StorageError {
        StorageError::Bridge("bridge unavailable".to_string())
    }

    #[async_trait]
    impl DeviceStorageBridge for FailingBridge {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(bridge_down())
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(bridge_down())
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(bridge_down())
        }

        async fn clear(&self) -> Result<(), StorageError> {
            Err(bridge_down())
        }
    }

    /// Accepts everything and remembers nothing.
    pub(crate) struct SilentBridge;

    #[async_trait]
    impl DeviceStorageBridge for SilentBridge {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Ok(())
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }

        async fn clear(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Well-behaved bridge backed by a map.
    #[derive(Default)]
    pub(crate) struct MemoryBridge {
        entries: tokio::sync::Mutex<HashMap<String, String>>,
    }

    impl MemoryBridge {
        pub(crate) async fn seed(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
        }

        pub(crate) async fn peek(&self, key: &str) -> Option<String> {
            self.entries.lock().await.get(key).cloned()
        }
    }

    #[async_trait]
    impl DeviceStorageBridge for MemoryBridge {
        async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.peek(key).await)
        }

        async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.seed(key, value).await;
            Ok(())
        }

        async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.entries.lock().await.remove(key);
            Ok(())
        }

        async fn clear(&self) -> Result<(), StorageError> {
            self.entries.lock().await.clear();
            Ok(())
        }
    }
}

pub(crate) use bridges::{FailingBridge, HangingBridge, MemoryBridge, SilentBridge};

/// Store wrapper that counts reads and can misbehave on request.
#[derive(Default)]
pub(crate) struct InstrumentedStore {
    pub(crate) inner: InMemoryStore,
    gets: AtomicUsize,
    get_delay: Option<Duration>,
    /// When set, `remove` and `clear` write this value instead of deleting
    resurrect: Option<String>,
}

impl InstrumentedStore {
    pub(crate) fn resurrecting(stale: &str) -> Self {
        Self {
            resurrect: Some(stale.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn with_get_delay(delay: Duration) -> Self {
        Self {
            get_delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for InstrumentedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.get_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match &self.resurrect {
            Some(stale) => self.inner.set(key, stale).await,
            None => self.inner.remove(key).await,
        }
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match &self.resurrect {
            Some(_) => Ok(()),
            None => self.inner.clear().await,
        }
    }
}

type Handler = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

struct Route {
    method: String,
    path: String,
    queue: VecDeque<HttpResponse>,
    handler: Option<Handler>,
    delay: Option<Duration>,
}

/// HTTP transport answering from per-route scripts. Unknown routes get a 404.
///
/// Routes match on method and URL path. A route's queued responses are used first, one per
/// call; after that its handler answers.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, method: &str, path: &str, status: u16, body: &str) {
        let response = HttpResponse::new(status_code(status), body);
        self.add_route(
            method,
            path,
            VecDeque::new(),
            Some(Box::new(move |_| response.clone())),
            None,
        );
    }

    pub(crate) fn respond_delayed(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: &str,
        delay: Duration,
    ) {
        let response = HttpResponse::new(status_code(status), body);
        self.add_route(
            method,
            path,
            VecDeque::new(),
            Some(Box::new(move |_| response.clone())),
            Some(delay),
        );
    }

    pub(crate) fn respond_with<F>(&self, method: &str, path: &str, handler: F)
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.add_route(method, path, VecDeque::new(), Some(Box::new(handler)), None);
    }

    pub(crate) fn respond_sequence(&self, method: &str, path: &str, responses: Vec<HttpResponse>) {
        self.add_route(method, path, responses.into(), None, None);
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn calls(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.as_str() == method && url_path(&r.url) == path)
            .count()
    }

    fn add_route(
        &self,
        method: &str,
        path: &str,
        queue: VecDeque<HttpResponse>,
        handler: Option<Handler>,
        delay: Option<Duration>,
    ) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        // A later script for the same route replaces the earlier one
        routes.retain(|r| !(r.method == method && r.path == path));
        routes.push(Route {
            method: method.to_string(),
            path: path.to_string(),
            queue,
            handler,
            delay,
        });
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn url_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default()
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let path = url_path(&request.url);
        let (response, delay) = {
            let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
            match routes
                .iter_mut()
                .find(|r| r.method == request.method.as_str() && r.path == path)
            {
                Some(route) => {
                    let response = match route.queue.pop_front() {
                        Some(response) => response,
                        None => match &route.handler {
                            Some(handler) => handler(&request),
                            None => HttpResponse::new(StatusCode::NOT_FOUND, "script exhausted"),
                        },
                    };
                    (response, route.delay)
                }
                None => (HttpResponse::new(StatusCode::NOT_FOUND, "no route"), None),
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(response)
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn assign(&self, url: &str) {
        self.visits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
    }
}

#[derive(Default)]
pub(crate) struct RecordingHaptics {
    digits: AtomicUsize,
    successes: AtomicUsize,
    failures: AtomicUsize,
}

impl RecordingHaptics {
    pub(crate) fn digits(&self) -> usize {
        self.digits.load(Ordering::SeqCst)
    }

    pub(crate) fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    pub(crate) fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

impl Haptics for RecordingHaptics {
    fn digit(&self) {
        self.digits.fetch_add(1, Ordering::SeqCst);
    }

    fn success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn failure(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

/// Platform authenticator with scripted answers and call recording.
pub(crate) struct ScriptedAuthenticator {
    platform: HostPlatform,
    supported: bool,
    available: bool,
    create_result: Result<Option<PlatformCredential>, BiometricError>,
    assertion_result: Result<Option<PlatformAssertion>, BiometricError>,
    assertion_delay: Option<Duration>,
    creation_delay: Option<Duration>,
    availability_checks: AtomicUsize,
    creation_calls: AtomicUsize,
    assertion_calls: AtomicUsize,
    last_creation: Mutex<Option<CredentialCreationOptions>>,
    last_request: Mutex<Option<CredentialRequestOptions>>,
}

impl ScriptedAuthenticator {
    pub(crate) const CREDENTIAL_ID: [u8; 4] = [0xfb, 0x01, 0x02, 0x03];

    /// An iOS device with a working authenticator.
    pub(crate) fn mobile() -> Self {
        Self {
            platform: HostPlatform::Ios,
            supported: true,
            available: true,
            create_result: Ok(Some(PlatformCredential {
                raw_id: Self::CREDENTIAL_ID.to_vec(),
            })),
            assertion_result: Ok(Some(PlatformAssertion {
                raw_id: Self::CREDENTIAL_ID.to_vec(),
            })),
            assertion_delay: None,
            creation_delay: None,
            availability_checks: AtomicUsize::new(0),
            creation_calls: AtomicUsize::new(0),
            assertion_calls: AtomicUsize::new(0),
            last_creation: Mutex::new(None),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn on_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    pub(crate) fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    pub(crate) fn without_authenticator(mut self) -> Self {
        self.available = false;
        self
    }

    pub(crate) fn with_create_result(
        mut self,
        result: Result<Option<PlatformCredential>, BiometricError>,
    ) -> Self {
        self.create_result = result;
        self
    }

    pub(crate) fn with_assertion_result(
        mut self,
        result: Result<Option<PlatformAssertion>, BiometricError>,
    ) -> Self {
        self.assertion_result = result;
        self
    }

    pub(crate) fn with_assertion_delay(mut self, delay: Duration) -> Self {
        self.assertion_delay = Some(delay);
        self
    }

    pub(crate) fn with_creation_delay(mut self, delay: Duration) -> Self {
        self.creation_delay = Some(delay);
        self
    }

    pub(crate) fn availability_checks(&self) -> usize {
        self.availability_checks.load(Ordering::SeqCst)
    }

    pub(crate) fn creation_calls(&self) -> usize {
        self.creation_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn assertion_calls(&self) -> usize {
        self.assertion_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_creation(&self) -> Option<CredentialCreationOptions> {
        self.last_creation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn last_request(&self) -> Option<CredentialRequestOptions> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl PlatformAuthenticator for ScriptedAuthenticator {
    fn platform(&self) -> HostPlatform {
        self.platform.clone()
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, BiometricError> {
        self.availability_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.available)
    }

    async fn create_credential(
        &self,
        options: &CredentialCreationOptions,
    ) -> Result<Option<PlatformCredential>, BiometricError> {
        self.creation_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_creation.lock().unwrap_or_else(|e| e.into_inner()) = Some(options.clone());
        if let Some(delay) = self.creation_delay {
            tokio::time::sleep(delay).await;
        }
        self.create_result.clone()
    }

    async fn get_assertion(
        &self,
        options: &CredentialRequestOptions,
    ) -> Result<Option<PlatformAssertion>, BiometricError> {
        self.assertion_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(options.clone());
        if let Some(delay) = self.assertion_delay {
            tokio::time::sleep(delay).await;
        }
        self.assertion_result.clone()
    }
}
