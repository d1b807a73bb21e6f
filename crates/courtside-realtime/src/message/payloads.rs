//! Typed payloads for the recognized inbound frame types.
//!
//! The channel fans frames out by their raw type string; subscribers
//! that want structure decode [`crate::events::bus::Event::data`] into
//! one of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a `game_updated` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdatedPayload {
    /// Game identifier.
    pub game_id: String,
    /// Current number of joined players.
    pub player_count: u32,
    /// Capacity of the game.
    pub max_players: u32,
    /// Game status, e.g. `open` or `full`.
    pub status: String,
}

/// Payload of a `notification_created` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCreatedPayload {
    /// Notification identifier.
    pub id: String,
    /// Notification category.
    #[serde(rename = "type")]
    pub kind: String,
    /// Short title.
    pub title: String,
    /// Notification body.
    pub message: String,
    /// Recipient user.
    pub user_id: String,
}

/// Payload of a `chat_message` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    /// Game whose chat the message belongs to.
    pub game_id: String,
    /// Sender.
    pub user_id: String,
    /// Sender display name.
    pub user_name: String,
    /// Message text.
    pub message: String,
    /// Send time.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
