//! # courtside-realtime
//!
//! The persistent duplex channel for the Courtside client. Provides:
//!
//! - A single long-lived WebSocket connection authenticated with the
//!   current access token
//! - Automatic reconnection with exponential backoff and an attempt
//!   ceiling
//! - A heartbeat ping to survive idle-timeout proxies
//! - Typed event fan-out so subscribers never deal with connection
//!   lifecycle
//!
//! Channel failures are absorbed and retried internally; the only
//! failure surfaced to the application is the `reconnect_exhausted`
//! event.

pub mod connection;
pub mod events;
pub mod message;

pub use connection::backoff::BackoffPolicy;
pub use connection::manager::ConnectionManager;
pub use connection::state::ConnectionState;
pub use events::bus::{Event, EventBus, Subscription};
pub use events::{TOPIC_CONNECTED, TOPIC_DISCONNECTED, TOPIC_RECONNECT_EXHAUSTED};
pub use message::types::{InboundFrame, OutboundFrame};
