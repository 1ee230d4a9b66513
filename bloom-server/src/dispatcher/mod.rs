//! Outbound event dispatcher
//!
//! Lifecycle events are enqueued after the owning transaction commits and
//! delivered by a background worker; the admission path never waits on
//! subscriber HTTP.

pub mod sign;
mod worker;

pub use worker::Dispatcher;

use serde_json::Value;
use shared::{EventEnvelope, EventType};
use tokio::sync::mpsc;

/// Default bound of the in-process event queue
pub const QUEUE_CAPACITY: usize = 1024;

/// Sending half of the dispatcher queue, shared through `AppState`
#[derive(Clone)]
pub struct EventQueue {
    tx: mpsc::Sender<EventEnvelope>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<EventEnvelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue an event for delivery. Never blocks; when the queue is
    /// full the event is dropped with an error log.
    pub fn enqueue(&self, event_type: EventType, data: Value) {
        let envelope = EventEnvelope::new(event_type, data);
        if let Err(e) = self.tx.try_send(envelope) {
            tracing::error!(event = %event_type, "EVENT DROPPED: {e}");
        }
    }
}
