//! # Composite health.
//!
//! [`Service::status`] asks every participant (the server, if any, and every
//! dependency) for its [`Health`](crate::Health) concurrently and reduces the
//! answers to one [`HealthReport`]:
//! - `code` is the largest code observed, `200` when there is nothing to ask;
//! - every reported error becomes a child of one
//!   "Service is not in a healthy state" stack.
//!
//! A participant whose `status` panics counts as `503` with an error.

use futures::FutureExt;
use serde::Serialize;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::lifecycle::panicked;
use super::service::Service;
use crate::error::ErrorStack;
use crate::events::{Event, EventKind};
use crate::integration::Health;

/// Aggregated health of a service.
///
/// Serializes as the body an HTTP health endpoint can return verbatim:
/// `{"status": 503, "error": {"message": "Service is not in a healthy state"}}`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// Worst (largest) HTTP status code reported by any participant.
    #[serde(rename = "status")]
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorStack>,
}

impl HealthReport {
    /// `2xx` with no error collected.
    pub fn is_healthy(&self) -> bool {
        (200..300).contains(&self.code) && self.error.is_none()
    }

    pub fn into_parts(self) -> (u16, Option<ErrorStack>) {
        (self.code, self.error)
    }

    /// `Ok(code)` when no error was collected, otherwise the code alongside the error.
    pub fn into_result(self) -> Result<u16, (u16, ErrorStack)> {
        match self.error {
            Some(err) => Err((self.code, err)),
            None => Ok(self.code),
        }
    }
}

impl Service {
    /// Polls every participant's health concurrently and keeps the worst code.
    pub async fn status(&self, ctx: CancellationToken) -> HealthReport {
        let (server, dependencies) = self.registry.participants();

        let mut set = JoinSet::new();
        if let Some(server) = server {
            let ctx = ctx.clone();
            set.spawn(async move { probe(server.name(), server.status(ctx)).await });
        }
        for dependency in dependencies {
            let ctx = ctx.clone();
            set.spawn(async move { probe(dependency.name(), dependency.status(ctx)).await });
        }

        let mut code = Health::OK;
        let mut stack = ErrorStack::new("Service is not in a healthy state");
        while let Some(joined) = set.join_next().await {
            let health = joined.unwrap_or_else(Health::unavailable);
            code = code.max(health.code);
            if let Some(err) = health.error {
                stack.push_child(err);
            }
        }

        let error = stack.has_children().then_some(stack);
        let mut event = Event::new(EventKind::HealthChecked).with_code(code);
        if let Some(err) = &error {
            event = event.with_reason(err.to_string());
        }
        self.bus.publish(event);

        HealthReport { code, error }
    }
}

async fn probe<F>(name: &str, status: F) -> Health
where
    F: std::future::Future<Output = Health>,
{
    match std::panic::AssertUnwindSafe(status).catch_unwind().await {
        Ok(health) => health,
        Err(panic) => Health::unavailable(panicked(name, panic)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::config::Config;
    use crate::testing::{MockDependency, MockServer};

    fn service() -> Arc<Service> {
        Service::builder(Config::default()).build()
    }

    #[tokio::test]
    async fn no_participants_is_healthy() {
        let report = service().status(CancellationToken::new()).await;
        assert_eq!(report.code, 200);
        assert!(report.error.is_none());
        assert!(report.is_healthy());
    }

    #[tokio::test]
    async fn worst_code_wins_and_errors_are_counted_independently() {
        let svc = service();
        svc.serve(MockServer::new("rest").into_ref()).unwrap();
        svc.attach(MockDependency::new("postgres").with_status(503, None).into_ref())
            .unwrap();
        svc.attach(
            MockDependency::new("valkey")
                .with_status(502, Some("valkey: connection refused"))
                .into_ref(),
        )
        .unwrap();

        let report = svc.status(CancellationToken::new()).await;
        assert_eq!(report.code, 503);
        let err = report.error.as_ref().unwrap();
        assert_eq!(err.children().len(), 1);
        assert_eq!(
            err.to_string(),
            "Service is not in a healthy state. Caused by:\n\n- valkey: connection refused\n"
        );
        assert!(!report.is_healthy());
    }

    #[tokio::test]
    async fn healthy_code_with_error_is_still_reported() {
        let svc = service();
        svc.serve(
            MockServer::new("rest")
                .with_status(200, Some("degraded"))
                .into_ref(),
        )
        .unwrap();

        let (code, err) = svc.status(CancellationToken::new()).await.into_parts();
        assert_eq!(code, 200);
        assert_eq!(err.unwrap().children().len(), 1);
    }

    #[tokio::test]
    async fn codes_below_200_are_floored() {
        let svc = service();
        svc.attach(MockDependency::new("bucket").with_status(100, None).into_ref())
            .unwrap();

        let report = svc.status(CancellationToken::new()).await;
        assert_eq!(report.into_result().unwrap(), 200);
    }

    #[tokio::test]
    async fn into_result_keeps_the_code_of_a_failing_report() {
        let svc = service();
        svc.serve(
            MockServer::new("rest")
                .with_status(200, Some("degraded"))
                .into_ref(),
        )
        .unwrap();
        svc.attach(
            MockDependency::new("postgres")
                .with_status(503, Some("down"))
                .into_ref(),
        )
        .unwrap();
        let (code, err) = svc
            .status(CancellationToken::new())
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(code, 503);
        assert_eq!(err.children().len(), 2);

        let svc = service();
        svc.serve(
            MockServer::new("rest")
                .with_status(200, Some("degraded"))
                .into_ref(),
        )
        .unwrap();
        let (code, _) = svc
            .status(CancellationToken::new())
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(code, 200);
    }

    #[tokio::test]
    async fn panicking_participant_reports_unavailable() {
        let svc = service();
        svc.serve(MockServer::new("rest").into_ref()).unwrap();
        svc.attach(MockDependency::new("postgres").panicking_status().into_ref())
            .unwrap();

        let report = svc.status(CancellationToken::new()).await;
        assert_eq!(report.code, 503);
        let text = report.error.unwrap().to_string();
        assert!(text.contains("Integration postgres panicked"));
        assert!(text.contains("postgres status exploded"));
    }

    #[tokio::test]
    async fn status_works_in_every_lifecycle_state() {
        let svc = service();
        svc.serve(MockServer::new("rest").panicking_status().into_ref())
            .unwrap();
        svc.registry.lock().initialized = true;
        svc.registry.lock().stopped = true;

        let report = svc.status(CancellationToken::new()).await;
        assert_eq!(report.code, 503);
    }

    #[tokio::test]
    async fn report_serializes_for_http() {
        let svc = service();
        svc.attach(
            MockDependency::new("postgres")
                .with_status(503, Some("down"))
                .into_ref(),
        )
        .unwrap();
        let mut rx = svc.subscribe();

        let report = svc.status(CancellationToken::new()).await;
        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "status": 503,
                "error": { "message": "Service is not in a healthy state" }
            })
        );

        let healthy = HealthReport { code: 200, error: None };
        assert_eq!(
            serde_json::to_string(&healthy).unwrap(),
            r#"{"status":200}"#
        );

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::HealthChecked);
        assert_eq!(ev.code, Some(503));
        assert!(ev.reason.is_some());
    }
}
