//! # LogWriter: lifecycle events to `tracing`.
//!
//! Forwards every [`Event`] to the `tracing` subscriber installed by the
//! process (see [`init_logging`](crate::init_logging)). Failures are logged
//! at `WARN`/`ERROR`, everything else at `INFO`/`DEBUG`.
//!
//! ## Example output
//! ```text
//! INFO servicevisor::subscribers::log: server registered integration="rest" seq=0
//! INFO servicevisor::subscribers::log: shutdown requested reason="terminate" seq=4
//! WARN servicevisor::subscribers::log: close failed integration="valkey" reason="timeout." seq=7
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber backed by `tracing`.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let integration = e.integration.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let seq = e.seq;

        match e.kind {
            EventKind::ServerRegistered => info!(integration, seq, "server registered"),
            EventKind::DependencyAttached => info!(integration, seq, "dependency attached"),
            EventKind::ServiceStarting => info!(integration, seq, "service starting"),
            EventKind::ShutdownRequested => info!(reason, seq, "shutdown requested"),
            EventKind::ServerFailed => error!(integration, reason, seq, "server failed"),
            EventKind::ServerExited => warn!(integration, seq, "server exited before shutdown"),
            EventKind::ServiceStopping => info!(seq, "service stopping"),
            EventKind::ServerStopped => info!(integration, seq, "server stopped"),
            EventKind::DependencyClosed => info!(integration, seq, "dependency closed"),
            EventKind::CloseFailed => warn!(integration, reason, seq, "close failed"),
            EventKind::StopFailed => error!(reason, seq, "stop failed"),
            EventKind::ServiceStopped => info!(seq, "service stopped"),
            EventKind::HealthChecked => match e.code {
                Some(code) if code > 200 => warn!(code, reason, seq, "health checked"),
                code => debug!(code, seq, "health checked"),
            },
            EventKind::SubscriberOverflow => {
                warn!(subscriber = integration, reason, seq, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = integration, reason, seq, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
