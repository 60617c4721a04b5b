//! Structured errors used across the service runtime.
//!
//! Every failure reported by this crate is an [`ErrorStack`]: a message, an
//! optional subsystem tag, a list of field-level [`Validation`]s and a list of
//! child errors. Registration and lifecycle guards report a single validation;
//! operational failures (a server that fails to start, a dependency that
//! fails to close, an unhealthy participant) are attached as children so that
//! each one keeps its own structure.
//!
//! ## Rendering
//! ```text
//! bucket: Failed to open. Reasons:
//!     - not found.
//!     - invalid region
//!       at Config > Region.
//!  Caused by:
//!
//! - postgres: Failed to close connection pool.
//! ```
//!
//! The rendered text ends up in logs and, through serde, in the
//! `message`/`validations` pair of HTTP error bodies. Its punctuation is
//! part of the public contract.

mod stack;
mod validation;

pub use stack::{BoxError, ErrorStack};
pub use validation::Validation;
