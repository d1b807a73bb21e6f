//! Inbound and outbound channel frame definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtside_core::result::ClientResult;

/// Event type of the server's heartbeat acknowledgment. Consumed by the
/// connection manager, never fanned out.
pub const PONG_TYPE: &str = "pong";

/// A frame received from the backend.
///
/// The backend tags every frame with a `type` string; the payload shape
/// under `data` varies per type, so it stays raw JSON here and is
/// decoded by interested subscribers (see [`crate::message::payloads`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    /// Frame type, e.g. `game_updated` or `chat_message`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Type-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Server-side emission time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl InboundFrame {
    /// Parses a raw text frame.
    pub fn parse(raw: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Whether this frame is a heartbeat acknowledgment.
    pub fn is_pong(&self) -> bool {
        self.event_type == PONG_TYPE
    }
}

/// Frames sent by the client over the channel.
///
/// All of these are best-effort liveness and presence signals; none
/// carry critical state, which is why the manager drops them instead of
/// queueing while the channel is down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OutboundFrame {
    /// Heartbeat probe.
    Ping,
    /// Presence status update.
    Presence {
        /// New status, e.g. `online` or `away`.
        status: String,
    },
    /// Typing indicator for a game chat.
    Typing {
        /// Game whose chat is being typed in.
        game_id: String,
        /// Whether the user is currently typing.
        is_typing: bool,
    },
}

impl OutboundFrame {
    /// Serializes the frame to its wire form.
    pub fn to_json(&self) -> ClientResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
