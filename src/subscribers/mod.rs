//! # Event subscribers for the service runtime.
//!
//! ```text
//! Service ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                        │
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                          LogWriter  Metrics   Custom
//! ```
//!
//! - [`Subscribe`]: trait for custom subscribers;
//! - [`SubscriberSet`]: per-subscriber queues and workers;
//! - [`LogWriter`]: built-in subscriber forwarding events to `tracing`.

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
