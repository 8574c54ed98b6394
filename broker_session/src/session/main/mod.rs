mod exchange;
mod guard;
mod orchestrator;
mod redirect;

pub use exchange::{decode_access_token, exchange_refresh_token};
pub use guard::route_decision;
pub use orchestrator::SessionOrchestrator;
pub use redirect::{Navigator, refresh_token_from_callback, sso_redirect_url};
