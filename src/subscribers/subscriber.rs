//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for reacting to lifecycle events
//! (logging, metrics, alerting) without touching the lifecycle itself.
//!
//! Each subscriber gets a dedicated worker task fed by its own bounded queue;
//! a slow or panicking subscriber only affects itself.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use servicevisor::{Event, EventKind, Subscribe};
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::ServerFailed | EventKind::StopFailed) {
//!             // page someone
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "alerts" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally. Panics are caught and published as
///   `SubscriberPanicked`, but they still lose the event.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event. Events arrive in FIFO order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic events.
    ///
    /// The default is `type_name::<Self>()`; override it with something short.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue (clamped to at least 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
