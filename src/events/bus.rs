//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]. Registration, lifecycle and
//! health code paths publish into it without blocking; the service's
//! listener task fans events out to the [`SubscriberSet`](crate::subscribers::SubscriberSet),
//! and callers may take their own receiver via [`Service::subscribe`](crate::Service::subscribe).
//!
//! ## Rules
//! - `publish()` never blocks and never fails; without receivers the event is dropped.
//! - Capacity is shared by all receivers; laggards observe `RecvError::Lagged(n)`.
//! - A receiver only sees events sent after it subscribed.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus; capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver for subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
