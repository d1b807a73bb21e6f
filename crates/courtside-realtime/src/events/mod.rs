//! Typed event fan-out to application subscribers.

pub mod bus;

/// Lifecycle topic emitted when the channel opens.
pub const TOPIC_CONNECTED: &str = "connected";
/// Lifecycle topic emitted when an open channel drops.
pub const TOPIC_DISCONNECTED: &str = "disconnected";
/// Terminal lifecycle topic emitted when the reconnect ceiling is hit.
pub const TOPIC_RECONNECT_EXHAUSTED: &str = "reconnect_exhausted";
