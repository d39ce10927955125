//! In-process event bus backed by a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use medq_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A domain event emitted by the queue engine.
///
/// Construct via [`QueueEvent::new`] and enrich with the builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEvent {
    /// Dot-separated event name, e.g. `"token.issued"`.
    pub event_type: String,

    /// Provider the event concerns, when there is one.
    pub provider_id: Option<DbId>,

    /// Patient the event concerns, when there is one.
    pub patient_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl QueueEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            provider_id: None,
            patient_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the provider the event concerns.
    pub fn with_provider(mut self, provider_id: DbId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }

    /// Attach the patient the event concerns.
    pub fn with_patient(mut self, patient_id: DbId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers independently
/// receive every published [`QueueEvent`].
pub struct EventBus {
    sender: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// notification delivery is best-effort by design.
    pub fn publish(&self, event: QueueEvent) {
        // A SendError only means there are zero receivers right now.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
