use crate::session::types::{AuthPhase, LockPhase, RouteDecision, SessionState};

/// Decides what a protected view does for the given session state.
pub fn route_decision(state: &SessionState) -> RouteDecision {
    match (state.auth_phase, state.lock_phase) {
        (AuthPhase::Authenticating, _) => RouteDecision::Pending,
        (AuthPhase::Unauthenticated, _) => RouteDecision::RequireLogin,
        (AuthPhase::Authenticated, LockPhase::Locked) => RouteDecision::RequireUnlock,
        (AuthPhase::Authenticated, LockPhase::Unlocked) => RouteDecision::Allow,
    }
}
