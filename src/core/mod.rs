//! Runtime core: registration, lifecycle and health.
//!
//! The public API of this module is [`Service`] (built with
//! [`ServiceBuilder`]), its [`Config`] and the [`HealthReport`] it produces.
//!
//! Internal modules:
//! - [`registry`]: mutex-guarded server/dependency bookkeeping;
//! - [`lifecycle`]: `start` (signal vs. server race) and `stop` (drain, then close);
//! - [`health`]: concurrent status fan-out and worst-code reduction;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`config`]: runtime settings, loadable from the environment.

mod builder;
mod config;
mod health;
mod lifecycle;
mod registry;
mod service;
mod shutdown;

pub use builder::ServiceBuilder;
pub use config::Config;
pub use health::HealthReport;
pub use service::Service;
pub use shutdown::{ParseSignalError, Signal, SignalSet};
