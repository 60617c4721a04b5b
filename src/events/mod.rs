//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`]: event classification and metadata;
//! - [`Bus`]: thin wrapper over `tokio::sync::broadcast`.
//!
//! ## Quick reference
//! - **Publishers**: registry (`serve`/`attach`), lifecycle (`start`/`stop`),
//!   health aggregator, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the service's subscriber listener (fans out to
//!   `SubscriberSet`) and any receiver taken with `Service::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
