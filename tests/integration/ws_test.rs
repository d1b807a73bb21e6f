//! Integration tests for the realtime channel lifecycle.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use courtside_credentials::CredentialStore;
use courtside_realtime::{
    ConnectionManager, ConnectionState, OutboundFrame, TOPIC_CONNECTED, TOPIC_RECONNECT_EXHAUSTED,
};

use crate::helpers::{wait_for, TestBackend};

const RECV_DEADLINE: Duration = Duration::from_secs(3);

fn manager_over(backend: &TestBackend, base_delay_ms: u64, max_attempts: u32) -> ConnectionManager {
    ConnectionManager::new(
        backend.realtime_config(base_delay_ms, max_attempts),
        Arc::new(CredentialStore::in_memory()),
    )
}

#[tokio::test]
async fn test_connect_emits_connected_and_fans_out_frames() {
    let backend = TestBackend::start().await;
    backend.state.set_greeting_frames(&[
        r#"{"type":"pong"}"#,
        r#"{"type":"chat_message","data":{"gameId":"g-1","message":"game on"},"timestamp":"2025-06-01T18:30:00Z"}"#,
    ]);

    let manager = manager_over(&backend, 50, 5);
    let mut connected = manager.subscribe(TOPIC_CONNECTED);
    let mut chat_a = manager.subscribe("chat_message");
    let mut chat_b = manager.subscribe("chat_message");
    let mut pong = manager.subscribe("pong");

    manager.connect();

    timeout(RECV_DEADLINE, connected.recv())
        .await
        .expect("connected in time")
        .expect("connected event");

    let got_a = timeout(RECV_DEADLINE, chat_a.recv())
        .await
        .expect("chat in time")
        .expect("chat event");
    let got_b = timeout(RECV_DEADLINE, chat_b.recv())
        .await
        .expect("chat in time")
        .expect("chat event");

    assert_eq!(got_a.data, got_b.data);
    assert_eq!(got_a.data["message"], "game on");
    assert!(got_a.timestamp.is_some());

    // The pong greeting arrived before the chat frame, so by now it has
    // been routed; heartbeat acknowledgments are never fanned out.
    assert!(pong.try_recv().is_none());

    assert!(manager.is_connected());
    manager.disconnect();
}

#[tokio::test]
async fn test_reconnects_after_drops_and_resets_attempt_counter() {
    let backend = TestBackend::start().await;
    // The first two accepted connections are dropped by the server.
    backend.state.close_first_ws.store(2, Ordering::SeqCst);

    let manager = manager_over(&backend, 30, 5);
    manager.connect();

    let settled = wait_for(
        || backend.state.ws_connections.load(Ordering::SeqCst) == 3 && manager.is_connected(),
        Duration::from_secs(5),
    )
    .await;
    assert!(settled, "channel should survive two drops and stay open");

    // A successful open starts the next backoff run from scratch.
    assert_eq!(manager.reconnect_attempts(), 0);
    manager.disconnect();
}

#[tokio::test]
async fn test_disconnect_cancels_pending_reconnect() {
    let backend = TestBackend::start().await;
    backend.state.close_first_ws.store(usize::MAX, Ordering::SeqCst);

    let manager = manager_over(&backend, 400, 5);
    manager.connect();

    // Wait until the first drop armed the backoff timer.
    let armed = wait_for(|| manager.reconnect_attempts() >= 1, Duration::from_secs(3)).await;
    assert!(armed, "first reconnect should have been scheduled");

    let connections_before = backend.state.ws_connections.load(Ordering::SeqCst);
    manager.disconnect();

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(
        backend.state.ws_connections.load(Ordering::SeqCst),
        connections_before,
        "a cancelled timer must not connect again"
    );
    assert_eq!(manager.state(), ConnectionState::Idle);
}

#[tokio::test]
async fn test_reconnect_ceiling_emits_exhausted_event() {
    let backend = TestBackend::start().await;
    backend.state.close_first_ws.store(usize::MAX, Ordering::SeqCst);

    let manager = manager_over(&backend, 20, 2);
    let mut exhausted = manager.subscribe(TOPIC_RECONNECT_EXHAUSTED);

    manager.connect();

    timeout(Duration::from_secs(5), exhausted.recv())
        .await
        .expect("exhausted in time")
        .expect("exhausted event");

    // Initial connection plus the two allowed retries.
    assert_eq!(backend.state.ws_connections.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_send_reaches_backend_while_open_and_drops_while_closed() {
    let backend = TestBackend::start().await;
    let manager = manager_over(&backend, 50, 5);

    // Not connected yet: best-effort frames are dropped, not queued.
    assert!(!manager.send(OutboundFrame::Presence {
        status: "online".to_string(),
    }));

    let mut connected = manager.subscribe(TOPIC_CONNECTED);
    manager.connect();
    timeout(RECV_DEADLINE, connected.recv())
        .await
        .expect("connected in time")
        .expect("connected event");

    assert!(manager.send(OutboundFrame::Typing {
        game_id: "g-9".to_string(),
        is_typing: true,
    }));

    let delivered = wait_for(
        || {
            backend
                .state
                .received_frames()
                .iter()
                .any(|frame| frame.contains("\"typing\"") && frame.contains("g-9"))
        },
        RECV_DEADLINE,
    )
    .await;
    assert!(delivered, "typing frame should reach the backend");

    manager.disconnect();
    assert_eq!(manager.state(), ConnectionState::Idle);
}
