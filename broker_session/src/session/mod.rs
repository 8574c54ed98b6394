mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use main::{
    Navigator, SessionOrchestrator, decode_access_token, exchange_refresh_token,
    refresh_token_from_callback, route_decision, sso_redirect_url,
};
pub use types::{
    AccessTokenClaims, AuthPhase, ExchangeResult, LockPhase, RouteDecision, SessionState, User,
};
