//! # Server capability.
//!
//! A [`Server`] defines how the service accepts work: a REST or GraphQL API,
//! a workflow worker, a queue consumer. Its [`start`](Server::start) blocks
//! for the whole life of the service; the lifecycle runs it on a dedicated
//! task and races it against OS shutdown signals.
//!
//! ## Call contract
//! ```text
//! Service::start ──► spawn(server.start(ctx))     exactly once
//! Service::stop  ──► server.stop(ctx)             exactly once, before any Dependency::close
//! Service::status ─► server.status(ctx)           any number of times, concurrently
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::Health;
use crate::error::BoxError;

/// Shared handle to the registered server.
pub type ServerRef = Arc<dyn Server>;

/// Inbound integration owning the service's main loop.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use servicevisor::{BoxError, Health, Server};
///
/// struct Api;
///
/// #[async_trait]
/// impl Server for Api {
///     fn name(&self) -> &str { "rest" }
///
///     async fn start(&self, ctx: CancellationToken) -> Result<(), BoxError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
///
///     async fn stop(&self, _ctx: CancellationToken) -> Result<(), BoxError> {
///         Ok(())
///     }
///
///     async fn status(&self, _ctx: CancellationToken) -> Health {
///         Health::healthy()
///     }
/// }
/// ```
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Stable, non-empty identity (`"rest"`, `"graphql"`, `"temporal"`, ...).
    ///
    /// Used in error messages and duplicate-registration diagnostics.
    fn name(&self) -> &str;

    /// Runs the server until the service stops or an unrecoverable failure occurs.
    ///
    /// Returning `Err` ends [`Service::start`](crate::Service::start) with that
    /// error as a child. Returning `Ok(())` early does not end the service.
    async fn start(&self, ctx: CancellationToken) -> Result<(), BoxError>;

    /// Gracefully drains in-flight work.
    async fn stop(&self, ctx: CancellationToken) -> Result<(), BoxError>;

    /// Health check; should most likely report `200` or `503`.
    async fn status(&self, ctx: CancellationToken) -> Health;
}
