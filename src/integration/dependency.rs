//! # Dependency capability.
//!
//! A [`Dependency`] is an outbound connection to an external system. It
//! connects eagerly in its own constructor and therefore has no start phase;
//! the service only closes it and asks for its health.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::Health;
use crate::error::BoxError;

/// Shared handle to an attached dependency.
pub type DependencyRef = Arc<dyn Dependency>;

/// Outbound integration (database, cache, blob storage, workflow client, ...).
#[async_trait]
pub trait Dependency: Send + Sync + 'static {
    /// Stable, non-empty identity (`"postgres"`, `"valkey"`, `"bucket"`, ...).
    fn name(&self) -> &str;

    /// Closes the connection.
    ///
    /// Called once per successful stop attempt, concurrently with every other
    /// dependency and only after the server has stopped. A failed stop is
    /// retried as a whole, so implementations should tolerate a second call.
    async fn close(&self, ctx: CancellationToken) -> Result<(), BoxError>;

    /// Health check; should most likely report `200` or `503`.
    async fn status(&self, ctx: CancellationToken) -> Health;
}
