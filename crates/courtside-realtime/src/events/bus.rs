//! Event bus keyed by frame type.
//!
//! Replaces the original inheritance-style emitter with a capability
//! interface: `subscribe` hands back a [`Subscription`] that receives
//! matching events and removes itself when dropped.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::message::types::InboundFrame;

/// An event delivered to subscribers. Lifecycle topics carry a null
/// payload; frame-derived events carry the frame's `data` verbatim.
#[derive(Debug, Clone)]
pub struct Event {
    /// Topic this event was published under.
    pub event_type: String,
    /// Payload.
    pub data: serde_json::Value,
    /// Emission time reported by the server, or the local time for
    /// lifecycle events.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Event {
    /// A lifecycle event for `topic`, stamped with the local time.
    pub fn lifecycle(topic: &str) -> Self {
        Self {
            event_type: topic.to_string(),
            data: serde_json::Value::Null,
            timestamp: Some(Utc::now()),
        }
    }
}

impl From<InboundFrame> for Event {
    fn from(frame: InboundFrame) -> Self {
        Self {
            event_type: frame.event_type,
            data: frame.data,
            timestamp: frame.timestamp,
        }
    }
}

#[derive(Debug)]
struct Subscriber {
    id: Uuid,
    tx: mpsc::UnboundedSender<Event>,
}

/// Registry of subscribers keyed by topic.
#[derive(Debug, Default)]
pub struct EventBus {
    topics: DashMap<String, Vec<Subscriber>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for `topic`.
    pub fn subscribe(self: &Arc<Self>, topic: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.topics
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber { id, tx });

        Subscription {
            topic: topic.to_string(),
            id,
            bus: Arc::clone(self),
            rx,
        }
    }

    /// Delivers `event` to every subscriber of its topic, pruning
    /// subscribers whose receiver is gone. Returns the delivery count.
    pub fn publish(&self, event: &Event) -> usize {
        let Some(mut subscribers) = self.topics.get_mut(&event.event_type) else {
            return 0;
        };
        subscribers.retain(|subscriber| subscriber.tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    /// Number of live subscribers for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    fn unsubscribe(&self, topic: &str, id: Uuid) {
        if let Some(mut subscribers) = self.topics.get_mut(topic) {
            subscribers.retain(|subscriber| subscriber.id != id);
            if subscribers.is_empty() {
                drop(subscribers);
                self.topics.remove(topic);
            }
        }
        debug!(topic, "Subscriber removed");
    }
}

/// A live subscription. Receives events for one topic until dropped or
/// explicitly unsubscribed.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    id: Uuid,
    bus: Arc<EventBus>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Subscription {
    /// The subscribed topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next event. Returns `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Removes this subscriber from the bus. Dropping has the same
    /// effect.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.topic, self.id);
    }
}
