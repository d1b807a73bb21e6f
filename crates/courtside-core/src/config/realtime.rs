//! Realtime channel configuration.

use serde::{Deserialize, Serialize};

/// Persistent WebSocket channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket endpoint URL, e.g. `wss://api.courtside.app/ws`.
    pub url: String,
    /// Heartbeat ping interval in seconds while the channel is open.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Floor of the reconnect backoff delay in milliseconds.
    #[serde(default = "default_base_delay")]
    pub reconnect_base_delay_ms: u64,
    /// Ceiling of the reconnect backoff delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub reconnect_max_delay_ms: u64,
    /// Reconnect attempt ceiling before the channel gives up.
    #[serde(default = "default_max_attempts")]
    pub max_reconnect_attempts: u32,
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_base_delay() -> u64 {
    1_000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    5
}
