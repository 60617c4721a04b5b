//! # Capability traits for integrations.
//!
//! Any integration that wants to take part in the service lifecycle
//! implements exactly one of:
//! - [`Server`]: accepts inbound work; at most one per [`Service`](crate::Service);
//! - [`Dependency`]: an outbound connection (database, cache, bucket, ...);
//!   any number per service.
//!
//! Both report an HTTP-shaped [`Health`]. The shared handle types are
//! [`ServerRef`] and [`DependencyRef`].

mod dependency;
mod health;
mod server;

pub use dependency::{Dependency, DependencyRef};
pub use health::Health;
pub use server::{Server, ServerRef};
