mod handlers;
mod host;
mod server;

use axum::Router;
use axum::routing::{get, post};
use std::env;
use std::sync::Arc;
use tokio::sync::Mutex;

use broker_session::{
    DeviceStorageBridge, HostCapabilities, NoHaptics, ReqwestTransport, SessionConfig,
    UnavailablePlatform,
};

use handlers::{
    AppState, api_proxy, delete_digit, index, login, logout, press_digit, sso_callback,
    unlock_status,
};
use host::{FileBridge, RedirectSlot};
use server::{init_tracing, serve_http};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo-session");

    let storage_bridge = env::var("DEMO_STORAGE_FILE")
        .ok()
        .map(|path| Arc::new(FileBridge::new(path)) as Arc<dyn DeviceStorageBridge>);
    let redirects = Arc::new(RedirectSlot::default());

    let host = HostCapabilities {
        storage_bridge,
        transport: Arc::new(ReqwestTransport::new()?),
        navigator: redirects.clone(),
        authenticator: Arc::new(UnavailablePlatform),
        haptics: Arc::new(NoHaptics),
    };
    let runtime = broker_session::init(host, SessionConfig::default()).await;

    let state = Arc::new(AppState {
        runtime,
        redirects,
        gate: Mutex::new(None),
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/auth/sso", get(sso_callback))
        .route("/unlock", get(unlock_status))
        .route("/unlock/digit/{digit}", post(press_digit))
        .route("/unlock/delete", post(delete_digit))
        .route("/logout", post(logout))
        .route("/api/{*path}", get(api_proxy))
        .with_state(state);

    let port = env::var("DEMO_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    serve_http(port, app).await?;
    Ok(())
}
