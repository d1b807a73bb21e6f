//! Connection manager for the persistent channel.
//!
//! Owns the single WebSocket connection: authenticates it with the
//! current access token, heartbeats while open, reconnects with bounded
//! exponential backoff after drops, and republishes inbound frames as
//! typed events. Channel failures never surface to callers as errors;
//! the only terminal signal is the `reconnect_exhausted` event.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use courtside_core::config::realtime::RealtimeConfig;
use courtside_credentials::CredentialStore;

use crate::events::bus::{Event, EventBus, Subscription};
use crate::events::{TOPIC_CONNECTED, TOPIC_DISCONNECTED, TOPIC_RECONNECT_EXHAUSTED};
use crate::message::types::{InboundFrame, OutboundFrame};

use super::backoff::BackoffPolicy;
use super::state::ConnectionState;

/// Commands consumed by the writer task that owns the socket sink.
#[derive(Debug)]
enum WriterCommand {
    Frame(OutboundFrame),
    Close,
}

/// Maintains the persistent duplex channel to the backend.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    inner: Arc<ManagerInner>,
}

#[derive(Debug)]
struct ManagerInner {
    config: RealtimeConfig,
    credentials: Arc<CredentialStore>,
    events: Arc<EventBus>,
    backoff: BackoffPolicy,
    state: Mutex<ConnectionState>,
    reconnect_attempts: AtomicU32,
    should_reconnect: AtomicBool,
    /// Writer handle of the live connection, present only while open.
    outbound: Mutex<Option<mpsc::UnboundedSender<WriterCommand>>>,
    /// Pending backoff timer, cleared (not merely ignored) on disconnect.
    reconnect_timer: Mutex<Option<JoinHandle<()>>>,
    /// Cancellation for the current connection task.
    cancel: Mutex<CancellationToken>,
}

impl ConnectionManager {
    /// Creates a manager over the shared credential store. No connection
    /// is attempted until [`connect`](Self::connect).
    pub fn new(config: RealtimeConfig, credentials: Arc<CredentialStore>) -> Self {
        let backoff = BackoffPolicy::new(
            config.reconnect_base_delay_ms,
            config.reconnect_max_delay_ms,
        );
        Self {
            inner: Arc::new(ManagerInner {
                config,
                credentials,
                events: Arc::new(EventBus::new()),
                backoff,
                state: Mutex::new(ConnectionState::Idle),
                reconnect_attempts: AtomicU32::new(0),
                should_reconnect: AtomicBool::new(false),
                outbound: Mutex::new(None),
                reconnect_timer: Mutex::new(None),
                cancel: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Opens the channel. No-op while already connecting or open, so
    /// callers and the reconnect timer can race safely.
    ///
    /// Must be called within a tokio runtime.
    pub fn connect(&self) {
        self.inner.should_reconnect.store(true, Ordering::SeqCst);
        ManagerInner::spawn_connection(&self.inner);
    }

    /// Closes the channel and suppresses reconnection. Any pending
    /// backoff timer is cancelled, not left to fire into a no-op.
    pub fn disconnect(&self) {
        self.inner.should_reconnect.store(false, Ordering::SeqCst);

        if let Some(timer) = lock(&self.inner.reconnect_timer).take() {
            timer.abort();
        }
        lock(&self.inner.cancel).cancel();
        self.inner.set_state(ConnectionState::Idle);
        info!("Realtime channel disconnected");
    }

    /// Transmits a frame if the channel is open; otherwise the frame is
    /// dropped with a warning. Outbound frames are best-effort signals,
    /// so there is no queue. Returns whether the frame was handed to
    /// the channel.
    pub fn send(&self, frame: OutboundFrame) -> bool {
        if self.state() != ConnectionState::Open {
            warn!(state = %self.state(), "Channel not open, dropping outbound frame");
            return false;
        }
        match lock(&self.inner.outbound).as_ref() {
            Some(tx) => tx.send(WriterCommand::Frame(frame)).is_ok(),
            None => false,
        }
    }

    /// Registers a subscriber for one event topic. Frame-derived topics
    /// match the wire `type`; lifecycle topics are
    /// [`TOPIC_CONNECTED`], [`TOPIC_DISCONNECTED`], and
    /// [`TOPIC_RECONNECT_EXHAUSTED`].
    pub fn subscribe(&self, topic: &str) -> Subscription {
        self.inner.events.subscribe(topic)
    }

    /// The shared event bus.
    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.inner.events)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *lock(&self.inner.state)
    }

    /// Whether the channel is currently open.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Reconnect attempts since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.reconnect_attempts.load(Ordering::SeqCst)
    }
}

impl ManagerInner {
    /// Spawns the connection task unless one is already active.
    fn spawn_connection(inner: &Arc<Self>) {
        let Some(cancel) = inner.begin_connecting() else {
            debug!("Connect ignored, channel already connecting or open");
            return;
        };
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            inner.run_connection(cancel).await;
        });
    }

    /// Transitions `Idle`/`Closed` to `Connecting` and arms a fresh
    /// cancellation token. Returns `None` when a connection is already
    /// active, keeping attempts serialized.
    fn begin_connecting(&self) -> Option<CancellationToken> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_active() {
            return None;
        }
        *state = ConnectionState::Connecting;

        let token = CancellationToken::new();
        *lock(&self.cancel) = token.clone();
        Some(token)
    }

    async fn run_connection(self: Arc<Self>, cancel: CancellationToken) {
        let url = self.channel_url();

        let stream = tokio::select! {
            result = connect_async(url.as_str()) => match result {
                Ok((stream, _response)) => stream,
                Err(e) => {
                    warn!(error = %e, "Channel connect failed");
                    self.finish_closed();
                    return;
                }
            },
            _ = cancel.cancelled() => return,
        };

        if cancel.is_cancelled() {
            // disconnect() won the race during the handshake.
            return;
        }

        info!(url = %self.config.url, "Realtime channel open");
        self.set_state(ConnectionState::Open);
        self.reconnect_attempts.store(0, Ordering::SeqCst);
        self.events.publish(&Event::lifecycle(TOPIC_CONNECTED));

        let (mut sink, mut source) = stream.split();
        let (writer_tx, mut writer_rx) = mpsc::unbounded_channel::<WriterCommand>();
        *lock(&self.outbound) = Some(writer_tx.clone());

        // The writer task owns the sink; heartbeats and caller sends are
        // serialized through one channel.
        let writer = tokio::spawn(async move {
            while let Some(command) = writer_rx.recv().await {
                match command {
                    WriterCommand::Frame(frame) => {
                        let text = match frame.to_json() {
                            Ok(text) => text,
                            Err(e) => {
                                warn!(error = %e, "Dropping unserializable outbound frame");
                                continue;
                            }
                        };
                        if sink.send(Message::text(text)).await.is_err() {
                            break;
                        }
                    }
                    WriterCommand::Close => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        });

        let heartbeat = tokio::spawn({
            let tx = writer_tx.clone();
            let every = Duration::from_secs(self.config.heartbeat_interval_seconds.max(1));
            async move {
                let mut interval = tokio::time::interval(every);
                // The first tick completes immediately; the first ping
                // belongs one full interval after open.
                interval.tick().await;
                loop {
                    interval.tick().await;
                    if tx.send(WriterCommand::Frame(OutboundFrame::Ping)).is_err() {
                        break;
                    }
                }
            }
        });

        let mut cancelled = false;
        loop {
            tokio::select! {
                message = source.next() => match message {
                    Some(Ok(Message::Text(text))) => self.route_frame(text.as_str()),
                    Some(Ok(Message::Close(_))) => {
                        debug!("Server closed the channel");
                        break;
                    }
                    // Protocol-level ping/pong and binary frames are the
                    // transport's concern.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "Channel transport error");
                        break;
                    }
                    None => {
                        debug!("Channel stream ended");
                        break;
                    }
                },
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
            }
        }

        heartbeat.abort();
        *lock(&self.outbound) = None;
        if cancelled {
            let _ = writer_tx.send(WriterCommand::Close);
        }
        drop(writer_tx);
        let _ = writer.await;

        if cancelled {
            // disconnect() already drove the state to Idle.
            return;
        }
        self.finish_closed();
    }

    /// Common close path: transition to `Closed`, emit `disconnected`
    /// when an open channel dropped, and schedule the next attempt.
    fn finish_closed(self: &Arc<Self>) {
        let previous = self.set_state(ConnectionState::Closed);
        if previous == ConnectionState::Open {
            self.events.publish(&Event::lifecycle(TOPIC_DISCONNECTED));
        }

        if self.should_reconnect.load(Ordering::SeqCst) {
            self.schedule_reconnect();
        } else {
            self.set_state(ConnectionState::Idle);
        }
    }

    /// Arms the backoff timer for the next attempt, or emits the
    /// terminal `reconnect_exhausted` event past the ceiling.
    fn schedule_reconnect(self: &Arc<Self>) {
        let attempt = self.reconnect_attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.config.max_reconnect_attempts {
            warn!(attempts = attempt, "Reconnect attempts exhausted, giving up");
            self.events
                .publish(&Event::lifecycle(TOPIC_RECONNECT_EXHAUSTED));
            return;
        }

        let delay = self.backoff.delay_for_attempt(attempt);
        info!(
            attempt = attempt + 1,
            max = self.config.max_reconnect_attempts,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        let inner = Arc::clone(self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !inner.should_reconnect.load(Ordering::SeqCst) {
                return;
            }
            // The attempt reads the credential store again here, since a
            // refresh may have rotated the token while we were waiting.
            Self::spawn_connection(&inner);
        });
        *lock(&self.reconnect_timer) = Some(timer);
    }

    /// Parses and fans out one inbound text frame. Heartbeat
    /// acknowledgments and unparseable frames are dropped; neither
    /// errors the connection.
    fn route_frame(&self, raw: &str) {
        let frame = match InboundFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping unparseable inbound frame");
                return;
            }
        };

        if frame.is_pong() {
            debug!("Heartbeat acknowledged");
            return;
        }

        let event_type = frame.event_type.clone();
        let delivered = self.events.publish(&Event::from(frame));
        if delivered == 0 {
            debug!(event_type = %event_type, "Inbound frame had no subscribers");
        }
    }

    /// Connection URL carrying the current access token as a query
    /// parameter, per the channel contract.
    fn channel_url(&self) -> String {
        match self.credentials.access_token() {
            Some(token) if !token.is_empty() => format!("{}?token={token}", self.config.url),
            _ => self.config.url.clone(),
        }
    }

    fn set_state(&self, next: ConnectionState) -> ConnectionState {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *state, next)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
