//! # Lifecycle events emitted by the service runtime.
//!
//! [`EventKind`] classifies what happened:
//! - **Registration**: a server was served, a dependency attached;
//! - **Lifecycle**: start, shutdown signal, server failure/exit, stop phases;
//! - **Health**: an aggregated health check completed;
//! - **Subscriber**: a subscriber queue overflowed or its handler panicked.
//!
//! [`Event`] carries the metadata relevant to each kind (integration name,
//! reason, status code) plus a global sequence number and a timestamp.
//!
//! ## Example
//! ```rust
//! use servicevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DependencyClosed)
//!     .with_integration("postgres")
//!     .with_reason("pool drained");
//!
//! assert_eq!(ev.kind, EventKind::DependencyClosed);
//! assert_eq!(ev.integration.as_deref(), Some("postgres"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration ===
    /// A server was registered.
    ///
    /// Sets: `integration`.
    ServerRegistered,

    /// A dependency was attached.
    ///
    /// Sets: `integration`.
    DependencyAttached,

    // === Lifecycle ===
    /// Start accepted; the server task is being launched.
    ///
    /// Sets: `integration` (server name).
    ServiceStarting,

    /// An OS shutdown signal was observed.
    ///
    /// Sets: `reason` (signal name).
    ShutdownRequested,

    /// The server's `start` returned an error or its task panicked.
    ///
    /// Sets: `integration`, `reason`.
    ServerFailed,

    /// The server's `start` returned `Ok(())` before any signal.
    ///
    /// Sets: `integration`.
    ServerExited,

    /// Stop accepted; the server is being drained.
    ServiceStopping,

    /// The server's `stop` returned successfully.
    ///
    /// Sets: `integration`.
    ServerStopped,

    /// A dependency's `close` returned successfully.
    ///
    /// Sets: `integration`.
    DependencyClosed,

    /// A server stop or dependency close failed.
    ///
    /// Sets: `integration`, `reason`.
    CloseFailed,

    /// Stop finished with failures; the service is still stoppable.
    ///
    /// Sets: `reason` (number of failures).
    StopFailed,

    /// Stop finished; the service is terminally stopped.
    ServiceStopped,

    // === Health ===
    /// An aggregated health check completed.
    ///
    /// Sets: `code`, `reason` (only when errors were collected).
    HealthChecked,

    // === Subscribers ===
    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `integration` (subscriber name), `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `integration` (subscriber name), `reason` (panic message).
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the integration (or subscriber) concerned.
    pub integration: Option<Arc<str>>,
    /// Human-readable detail (error text, signal, ...).
    pub reason: Option<Arc<str>>,
    /// HTTP-shaped status code (health events).
    pub code: Option<u16>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            integration: None,
            reason: None,
            code: None,
        }
    }

    #[inline]
    pub fn with_integration(mut self, name: impl Into<Arc<str>>) -> Self {
        self.integration = Some(name.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_integration(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_integration(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::ServiceStarting);
        let b = Event::new(EventKind::ServiceStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_fill_metadata() {
        let ev = Event::new(EventKind::HealthChecked).with_code(503).with_reason("1 error");
        assert_eq!(ev.code, Some(503));
        assert_eq!(ev.reason.as_deref(), Some("1 error"));
        assert!(ev.integration.is_none());
    }
}
