//! Stub Courtside backend for integration tests.
//!
//! Serves the refresh endpoint, one authenticated API route, and the
//! realtime WebSocket endpoint on an ephemeral port. Test state knobs
//! script failure modes (rejected refreshes, stale tokens, dropped
//! channels) and record what the client actually did.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use tokio::net::TcpListener;

use courtside_client::{CourtsideClient, CredentialStore};
use courtside_core::config::api::ApiConfig;
use courtside_core::config::credentials::CredentialConfig;
use courtside_core::config::realtime::RealtimeConfig;
use courtside_core::config::ClientConfig;

/// Scriptable backend state shared with the test body.
#[derive(Debug, Default)]
pub struct BackendState {
    /// Refresh calls observed.
    pub refresh_calls: AtomicUsize,
    /// Delay applied before answering a refresh, to widen the window in
    /// which concurrent 401s pile up behind one flight.
    pub refresh_delay_ms: AtomicU64,
    /// When set, the refresh endpoint answers 400.
    pub fail_refresh: AtomicBool,
    /// When set, refreshes succeed but mint a token the API still
    /// rejects (dead-session simulation).
    pub stale_refresh: AtomicBool,
    /// Token currently accepted by the API.
    pub valid_token: Mutex<String>,
    /// WebSocket connections accepted so far.
    pub ws_connections: AtomicUsize,
    /// Close this many WebSocket connections right after accepting.
    pub close_first_ws: AtomicUsize,
    /// Frames pushed down each WebSocket connection after accept.
    pub greeting_frames: Mutex<Vec<String>>,
    /// Text frames received from the client over WebSocket.
    pub received_frames: Mutex<Vec<String>>,
}

impl BackendState {
    pub fn valid_token(&self) -> String {
        self.valid_token.lock().expect("token lock").clone()
    }

    pub fn set_valid_token(&self, token: &str) {
        *self.valid_token.lock().expect("token lock") = token.to_string();
    }

    pub fn set_greeting_frames(&self, frames: &[&str]) {
        *self.greeting_frames.lock().expect("frames lock") =
            frames.iter().map(|f| f.to_string()).collect();
    }

    pub fn received_frames(&self) -> Vec<String> {
        self.received_frames.lock().expect("frames lock").clone()
    }
}

/// A running stub backend.
pub struct TestBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState {
            valid_token: Mutex::new("valid-0".to_string()),
            ..BackendState::default()
        });

        let app = Router::new()
            .route("/auth/refresh", post(refresh))
            .route("/api/profile", get(profile))
            .route("/ws", get(ws_upgrade))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url(),
            timeout_seconds: 5,
            refresh_path: "/auth/refresh".to_string(),
            user_agent: "courtside-client-tests".to_string(),
        }
    }

    pub fn realtime_config(&self, base_delay_ms: u64, max_attempts: u32) -> RealtimeConfig {
        RealtimeConfig {
            url: self.ws_url(),
            heartbeat_interval_seconds: 30,
            reconnect_base_delay_ms: base_delay_ms,
            reconnect_max_delay_ms: 2_000,
            max_reconnect_attempts: max_attempts,
        }
    }

    /// Assembles the full layer over an in-memory store seeded with an
    /// access token the API will reject (forcing the refresh flow).
    pub async fn client_with_expired_session(&self) -> (CourtsideClient, Arc<CredentialStore>) {
        let store = Arc::new(CredentialStore::in_memory());
        store
            .set("expired-token", Some("refresh-1".to_string()))
            .await
            .expect("seed store");

        let config = ClientConfig {
            api: self.api_config(),
            realtime: self.realtime_config(50, 5),
            credentials: CredentialConfig::default(),
        };
        let client =
            CourtsideClient::with_store(config, Arc::clone(&store)).expect("build client");
        (client, store)
    }
}

/// Polls `predicate` until it holds or the deadline passes.
pub async fn wait_for(predicate: impl Fn() -> bool, deadline: Duration) -> bool {
    let started = tokio::time::Instant::now();
    while started.elapsed() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    predicate()
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody {
    refresh_token: String,
}

async fn refresh(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<RefreshBody>,
) -> impl IntoResponse {
    assert!(!body.refresh_token.is_empty());

    let calls = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if state.fail_refresh.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "message": "invalid refresh token" })),
        )
            .into_response();
    }

    let minted = format!("minted-{calls}");
    if !state.stale_refresh.load(Ordering::SeqCst) {
        state.set_valid_token(&minted);
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "accessToken": minted,
            "refreshToken": "rotated-refresh",
        })),
    )
        .into_response()
}

async fn profile(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let expected = format!("Bearer {}", state.valid_token());
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false);

    if authorized {
        Json(serde_json::json!({ "id": "u-1", "name": "Sam" })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": "token expired" })),
        )
            .into_response()
    }
}

#[derive(Debug, serde::Deserialize)]
struct WsQuery {
    #[allow(dead_code)]
    token: Option<String>,
}

async fn ws_upgrade(
    State(state): State<Arc<BackendState>>,
    Query(_query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<BackendState>) {
    state.ws_connections.fetch_add(1, Ordering::SeqCst);

    let close_immediately = state
        .close_first_ws
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if close_immediately {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    let greetings = state.greeting_frames.lock().expect("frames lock").clone();
    for frame in greetings {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }

    while let Some(Ok(message)) = socket.recv().await {
        if let Message::Text(text) = message {
            let raw = text.as_str().to_string();
            let is_ping = raw.contains("\"ping\"");
            state.received_frames.lock().expect("frames lock").push(raw);
            if is_ping {
                let _ = socket
                    .send(Message::Text(r#"{"type":"pong"}"#.into()))
                    .await;
            }
        }
    }
}
