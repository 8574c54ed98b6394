/// Session lifecycle flows: SSO login, PIN creation, restore after restart, logout.
use std::sync::Arc;

use broker_session::{
    AuthPhase, GateMode, PIN_ATTEMPTS_KEY, PIN_SECRET_KEY, REFRESH_TOKEN_KEY, RouteDecision,
    refresh_token_from_callback, route_decision,
};

use crate::common::mock_broker::{LOGIN, VALID_REFRESH_TOKEN};
use crate::common::{
    CALLBACK_URL, MemoryBridge, MockBroker, RecordingNavigator, SSO_URL, enter_pin, start_runtime,
};

#[tokio::test]
async fn test_sso_login_then_restart_restores_locked_session() {
    // Given a fresh device and a reachable broker
    let broker = MockBroker::start().await;
    let bridge = Arc::new(MemoryBridge::default());
    let navigator = Arc::new(RecordingNavigator::default());

    let runtime = start_runtime(&broker, bridge.clone(), navigator.clone()).await;
    assert_eq!(
        route_decision(&runtime.session.state()),
        RouteDecision::RequireLogin
    );
    assert_eq!(broker.refresh_calls(), 0);

    // When the user goes through the SSO page
    runtime.session.login().unwrap();
    let redirect = navigator.last().unwrap();
    assert!(redirect.starts_with(SSO_URL));
    assert!(!redirect.contains("exit=1"));

    let callback = format!("{CALLBACK_URL}?refreshToken={VALID_REFRESH_TOKEN}");
    let refresh_token = refresh_token_from_callback(&callback).unwrap();
    assert!(
        runtime
            .session
            .complete_external_login(&refresh_token)
            .await
            .unwrap()
    );

    // Then the session is authenticated but locked until a PIN is created
    let state = runtime.session.state();
    assert_eq!(state.user.as_ref().unwrap().login, LOGIN);
    assert_eq!(route_decision(&state), RouteDecision::RequireUnlock);
    assert_eq!(
        bridge.peek(REFRESH_TOKEN_KEY).as_deref(),
        Some(VALID_REFRESH_TOKEN)
    );

    let gate = runtime.unlock_gate().await.unwrap();
    assert_eq!(gate.status().await.mode, GateMode::Create);
    let status = enter_pin(&gate, "2468").await;
    assert!(status.unlocked);
    assert_eq!(
        route_decision(&runtime.session.state()),
        RouteDecision::Allow
    );
    drop(runtime);

    // When the process restarts on the same device
    let restarted = start_runtime(&broker, bridge.clone(), navigator).await;

    // Then the stored refresh token restores a locked session that asks for the same PIN
    assert_eq!(
        route_decision(&restarted.session.state()),
        RouteDecision::RequireUnlock
    );
    assert_eq!(broker.refresh_calls(), 2);

    let gate = restarted.unlock_gate().await.unwrap();
    assert_eq!(gate.status().await.mode, GateMode::Verify);
    let status = enter_pin(&gate, "2468").await;
    assert!(status.unlocked);
    assert_eq!(
        route_decision(&restarted.session.state()),
        RouteDecision::Allow
    );
}

#[tokio::test]
async fn test_revoked_refresh_token_is_dropped_on_restore() {
    // Given a device holding a refresh token the broker no longer accepts
    let broker = MockBroker::start().await;
    let bridge = Arc::new(MemoryBridge::default());
    bridge.seed(REFRESH_TOKEN_KEY, "rt-revoked");

    // When the runtime starts
    let runtime =
        start_runtime(&broker, bridge.clone(), Arc::new(RecordingNavigator::default())).await;

    // Then the session is unauthenticated and the dead token is gone
    assert_eq!(
        runtime.session.state().auth_phase,
        AuthPhase::Unauthenticated
    );
    assert_eq!(broker.refresh_calls(), 1);
    assert!(bridge.peek(REFRESH_TOKEN_KEY).is_none());
}

#[tokio::test]
async fn test_wrong_pin_keeps_session_locked() {
    let broker = MockBroker::start().await;
    let bridge = Arc::new(MemoryBridge::default());
    bridge.seed(REFRESH_TOKEN_KEY, VALID_REFRESH_TOKEN);
    bridge.seed(PIN_SECRET_KEY, "2468");

    let runtime =
        start_runtime(&broker, bridge.clone(), Arc::new(RecordingNavigator::default())).await;
    let gate = runtime.unlock_gate().await.unwrap();

    let status = enter_pin(&gate, "1111").await;

    assert!(!status.unlocked);
    assert_eq!(status.remaining_attempts, 9);
    assert_eq!(
        status.error.unwrap().to_string(),
        "Incorrect PIN. Attempts left: 9"
    );
    assert_eq!(
        route_decision(&runtime.session.state()),
        RouteDecision::RequireUnlock
    );
}

#[tokio::test]
async fn test_restart_does_not_refill_pin_attempts() {
    // Given a locked session that already burned two attempts
    let broker = MockBroker::start().await;
    let bridge = Arc::new(MemoryBridge::default());
    bridge.seed(REFRESH_TOKEN_KEY, VALID_REFRESH_TOKEN);
    bridge.seed(PIN_SECRET_KEY, "2468");
    let navigator = Arc::new(RecordingNavigator::default());

    let runtime = start_runtime(&broker, bridge.clone(), navigator.clone()).await;
    let gate = runtime.unlock_gate().await.unwrap();
    enter_pin(&gate, "1111").await;
    enter_pin(&gate, "2222").await;
    drop(runtime);

    // When the app is restarted
    let restarted = start_runtime(&broker, bridge.clone(), navigator).await;
    let gate = restarted.unlock_gate().await.unwrap();

    // Then the gate continues from the stored count
    assert_eq!(gate.status().await.remaining_attempts, 8);
    let status = enter_pin(&gate, "3333").await;
    assert_eq!(status.remaining_attempts, 7);
    assert_eq!(bridge.peek(PIN_ATTEMPTS_KEY).as_deref(), Some("7"));

    // And the right PIN clears the stored count
    let status = enter_pin(&gate, "2468").await;
    assert!(status.unlocked);
    assert!(bridge.peek(PIN_ATTEMPTS_KEY).is_none());
}

#[tokio::test]
async fn test_logout_clears_device_and_exits_sso() {
    // Given an unlocked session
    let broker = MockBroker::start().await;
    let bridge = Arc::new(MemoryBridge::default());
    bridge.seed(REFRESH_TOKEN_KEY, VALID_REFRESH_TOKEN);
    let navigator = Arc::new(RecordingNavigator::default());
    let runtime = start_runtime(&broker, bridge.clone(), navigator.clone()).await;
    let gate = runtime.unlock_gate().await.unwrap();
    enter_pin(&gate, "2468").await;

    // When the user logs out
    assert!(runtime.session.logout().await.unwrap());

    // Then tokens are gone from the device and the SSO exit page is opened
    assert!(bridge.peek(REFRESH_TOKEN_KEY).is_none());
    assert_eq!(
        route_decision(&runtime.session.state()),
        RouteDecision::RequireLogin
    );
    let exit = navigator.last().unwrap();
    assert!(exit.starts_with(SSO_URL));
    assert!(exit.contains("exit=1"));
}
