use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;

use broker_session::{
    RequestOptions, RouteDecision, SessionRuntime, UnlockGate, refresh_token_from_callback,
    route_decision,
};

use crate::host::RedirectSlot;

pub(crate) struct AppState {
    pub(crate) runtime: SessionRuntime,
    pub(crate) redirects: Arc<RedirectSlot>,
    pub(crate) gate: Mutex<Option<Arc<UnlockGate>>>,
}

type Shared = State<Arc<AppState>>;

fn error(status: StatusCode, message: impl ToString) -> Response {
    (status, Json(json!({ "error": message.to_string() }))).into_response()
}

/// Follows the navigation the session asked for, or falls back to the session summary.
fn follow(state: &AppState) -> Response {
    match state.redirects.take() {
        Some(target) => Redirect::to(&target).into_response(),
        None => Redirect::to("/").into_response(),
    }
}

pub(crate) async fn index(State(state): Shared) -> Json<Value> {
    let session = state.runtime.session.state();
    Json(json!({
        "session": session,
        "route": route_decision(&session),
        "loggingOut": state.runtime.session.is_logging_out(),
    }))
}

pub(crate) async fn login(State(state): Shared) -> Response {
    match state.runtime.session.login() {
        Ok(()) => follow(&state),
        Err(e) => error(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

pub(crate) async fn sso_callback(State(state): Shared, uri: Uri) -> Response {
    let callback = format!(
        "{}?{}",
        state.runtime.client.endpoints().callback_url,
        uri.query().unwrap_or_default()
    );

    let refresh_token = match refresh_token_from_callback(&callback) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("SSO callback rejected: {}", e);
            return Redirect::to("/login").into_response();
        }
    };

    match state
        .runtime
        .session
        .complete_external_login(&refresh_token)
        .await
    {
        Ok(true) => Redirect::to("/unlock").into_response(),
        Ok(false) => Redirect::to("/login").into_response(),
        Err(e) => error(StatusCode::BAD_GATEWAY, e),
    }
}

/// Returns the gate for the current lock, opening it (and firing the biometric prompt) once.
async fn current_gate(state: &AppState) -> Result<Arc<UnlockGate>, Response> {
    let mut slot = state.gate.lock().await;
    if let Some(gate) = slot.as_ref() {
        let status = gate.status().await;
        if !status.unlocked && !status.logged_out {
            return Ok(gate.clone());
        }
    }

    let gate = Arc::new(
        state
            .runtime
            .unlock_gate()
            .await
            .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e))?,
    );
    gate.start().await;
    *slot = Some(gate.clone());
    Ok(gate)
}

pub(crate) async fn unlock_status(State(state): Shared) -> Response {
    if route_decision(&state.runtime.session.state()) != RouteDecision::RequireUnlock {
        return error(StatusCode::CONFLICT, "session is not locked");
    }
    match current_gate(&state).await {
        Ok(gate) => Json(gate.status().await).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn press_digit(State(state): Shared, Path(digit): Path<char>) -> Response {
    if route_decision(&state.runtime.session.state()) != RouteDecision::RequireUnlock {
        return error(StatusCode::CONFLICT, "session is not locked");
    }
    let gate = match current_gate(&state).await {
        Ok(gate) => gate,
        Err(response) => return response,
    };

    match gate.press_digit(digit).await {
        Ok(status) if status.logged_out => follow(&state),
        Ok(status) => {
            let message = status.error.as_ref().map(ToString::to_string);
            Json(json!({ "status": status, "message": message })).into_response()
        }
        Err(e) => error(StatusCode::BAD_REQUEST, e),
    }
}

pub(crate) async fn delete_digit(State(state): Shared) -> Response {
    match state.gate.lock().await.as_ref() {
        Some(gate) => Json(gate.delete_digit().await).into_response(),
        None => error(StatusCode::CONFLICT, "no PIN entry in progress"),
    }
}

pub(crate) async fn logout(State(state): Shared) -> Response {
    let gate = state.gate.lock().await.take();
    let result = state
        .runtime
        .session
        .logout_with(|| async move {
            drop(gate);
            tracing::debug!("Dropped pending PIN entry before logout");
        })
        .await;

    match result {
        Ok(_) => follow(&state),
        Err(e) => error(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Forwards a GET to the broker API through the re-authenticating client.
pub(crate) async fn api_proxy(State(state): Shared, Path(path): Path<String>) -> Response {
    match route_decision(&state.runtime.session.state()) {
        RouteDecision::Allow => {}
        RouteDecision::RequireUnlock => return error(StatusCode::LOCKED, "unlock first"),
        _ => return error(StatusCode::UNAUTHORIZED, "log in first"),
    }

    match state
        .runtime
        .client
        .get::<Value>(&format!("/{path}"), RequestOptions::default())
        .await
    {
        Ok(value) => Json(value).into_response(),
        Err(e) => {
            let status = e.status().unwrap_or(StatusCode::BAD_GATEWAY);
            error(status, e)
        }
    }
}
