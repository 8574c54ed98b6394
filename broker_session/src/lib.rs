//! broker_session - authenticated-session lifecycle for the brokerage mini-app
//!
//! Persists credentials through an unreliable host storage bridge, trades the SSO refresh
//! token for short-lived access tokens, re-authenticates API calls transparently on 401,
//! and keeps a PIN/biometric gate in front of an authenticated session.

mod biometric;
mod client;
mod config;
mod coordination;
mod session;
mod storage;
mod token;
mod unlock;
mod utils;

#[cfg(test)]
mod test_utils;

pub use coordination::{HostCapabilities, SessionConfig, SessionRuntime, init};

pub use config::EndpointConfig;

pub use storage::{
    ACCESS_TOKEN_KEY, BIOMETRIC_CREDENTIAL_KEY, BIOMETRIC_ENABLED_KEY, BridgedStore,
    DeviceStorageBridge, InMemoryStore, KeyValueStore, LAST_PORTFOLIO_KEY, PIN_ATTEMPTS_KEY,
    PIN_SECRET_KEY, PortfolioPreference, REFRESH_TOKEN_KEY, StorageError, select_store,
    select_store_with_timeout,
};
pub use token::TokenCache;

pub use client::{
    ApiClient, ApiError, HttpRequest, HttpResponse, HttpTransport, RequestOptions,
    ReqwestTransport,
};

pub use session::{
    AccessTokenClaims, AuthPhase, ExchangeResult, LockPhase, Navigator, RouteDecision,
    SessionError, SessionOrchestrator, SessionState, User, decode_access_token,
    exchange_refresh_token, refresh_token_from_callback, route_decision, sso_redirect_url,
};

pub use biometric::{
    AllowCredential, AuthenticatorSelection, BiometricConfig, BiometricError, BiometricManager,
    CredentialCreationOptions, CredentialRequestOptions, HostPlatform, PlatformAssertion,
    PlatformAuthenticator, PlatformCredential, PubKeyCredParam, PublicKeyCredentialUserEntity,
    RelyingParty, UnavailablePlatform,
};

pub use unlock::{
    GateMode, GateStatus, Haptics, NoHaptics, PinError, UnlockConfig, UnlockError, UnlockGate,
};

pub use utils::{RequestGeneration, UtilError};
