//! # Service: the runtime shell around one server and its dependencies.
//!
//! A [`Service`] is an explicitly constructed, explicitly owned value:
//! build one at process start with [`Service::builder`], share the returned
//! `Arc` with whatever needs it (health endpoint, main loop) and drive it
//! through its lifecycle.
//!
//! ## Lifecycle
//! ```text
//!                 serve()/attach()
//!                  ┌──────────┐
//!                  ▼          │
//!           ┌───────────────┐ │  start() ok   ┌─────────────┐  stop() ok   ┌─────────┐
//!   new ──► │ Uninitialized ├─┴─────────────► │ Initialized ├────────────► │ Stopped │
//!           └───────────────┘                 └──────┬──────┘              └─────────┘
//!                                                    │ ▲
//!                                                    └─┘ stop() with failures (retryable)
//! ```
//!
//! - `start` races the server's blocking `start` against OS shutdown signals;
//! - `stop` drains the server first, then closes every dependency concurrently;
//! - `status` polls every participant concurrently and keeps the worst code.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use servicevisor::{Config, LogWriter, Service, ServerRef};
//! # use servicevisor::{BoxError, Health, Server};
//! # struct Api;
//! # #[async_trait::async_trait]
//! # impl Server for Api {
//! #     fn name(&self) -> &str { "rest" }
//! #     async fn start(&self, ctx: CancellationToken) -> Result<(), BoxError> { ctx.cancelled().await; Ok(()) }
//! #     async fn stop(&self, _ctx: CancellationToken) -> Result<(), BoxError> { Ok(()) }
//! #     async fn status(&self, _ctx: CancellationToken) -> Health { Health::healthy() }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = Service::builder(Config::from_env()?)
//!         .with_subscriber(Arc::new(LogWriter::new()))
//!         .build();
//!
//!     let api: ServerRef = Arc::new(Api);
//!     service.serve(api)?;
//!
//!     let ctx = CancellationToken::new();
//!     service.start(ctx.clone()).await?;
//!     ctx.cancel();
//!     service.stop(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::builder::ServiceBuilder;
use super::config::Config;
use super::registry::Registry;
use crate::error::ErrorStack;
use crate::events::{Bus, Event};
use crate::integration::{DependencyRef, ServerRef};

/// Runtime shell managing one server, its dependencies and their health.
pub struct Service {
    pub(crate) cfg: Config,
    pub(crate) registry: Registry,
    pub(crate) bus: Bus,
    /// Serializes `stop` calls; held across the drain, unlike the registry lock.
    pub(crate) stop_gate: tokio::sync::Mutex<()>,
    /// Cancelled on drop; ends the subscriber listener.
    pub(crate) runtime_token: CancellationToken,
}

impl Service {
    /// Returns a builder for a service with the given configuration.
    pub fn builder(cfg: Config) -> ServiceBuilder {
        ServiceBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, bus: Bus, runtime_token: CancellationToken) -> Self {
        Self {
            cfg,
            registry: Registry::new(bus.clone()),
            bus,
            stop_gate: tokio::sync::Mutex::new(()),
            runtime_token,
        }
    }

    /// Registers the server integration. Only one server per service.
    ///
    /// Fails when the service is initialized or stopped, when `server` is
    /// `None` or has an empty name, or when a server is already registered.
    pub fn serve(&self, server: impl Into<Option<ServerRef>>) -> Result<(), ErrorStack> {
        self.registry.serve(server.into())
    }

    /// Attaches a dependency integration; it is closed when the service stops.
    ///
    /// Fails when the service is initialized or stopped, or when `dependency`
    /// is `None` or has an empty name.
    pub fn attach(&self, dependency: impl Into<Option<DependencyRef>>) -> Result<(), ErrorStack> {
        self.registry.attach(dependency.into())
    }

    /// The registered server, if any.
    pub fn server(&self) -> Option<ServerRef> {
        self.registry.server()
    }

    /// Attached dependencies, in registration order.
    pub fn dependencies(&self) -> Vec<DependencyRef> {
        self.registry.dependencies()
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.lock().initialized
    }

    pub fn is_stopped(&self) -> bool {
        self.registry.lock().stopped
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Receiver for lifecycle events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }
}

impl Drop for Service {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::EventKind;
    use crate::testing::{MockDependency, MockServer};

    fn service() -> Arc<Service> {
        Service::builder(Config::default()).build()
    }

    #[test]
    fn serve_registers_server() {
        let svc = service();
        assert!(svc.server().is_none());

        let server: ServerRef = Arc::new(MockServer::new("rest"));
        svc.serve(server.clone()).unwrap();

        let current = svc.server().unwrap();
        assert!(Arc::ptr_eq(&current, &server));
    }

    #[test]
    fn serve_rejects_none() {
        let svc = service();
        let err = svc.serve(None).unwrap_err();

        let text = err.to_string();
        assert!(text.contains("Failed to register server integration"));
        assert!(text.contains("must not be nil"));
        assert_eq!(err.validations().len(), 1);
        assert!(!err.has_children());
        assert!(svc.server().is_none());
    }

    #[test]
    fn serve_rejects_empty_name() {
        let svc = service();
        let err = svc.serve(MockServer::new("").into_ref()).unwrap_err();
        assert!(err.to_string().contains("Server's name must be set"));
        assert_eq!(err.validations()[0].path, vec!["server.name()"]);
        assert!(svc.server().is_none());
    }

    #[test]
    fn serve_rejects_second_server_naming_the_first() {
        let svc = service();
        svc.serve(MockServer::new("rest").into_ref()).unwrap();

        let err = svc.serve(MockServer::new("graphql").into_ref()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("already been registered"));
        assert!(text.contains("(rest)"));
        assert_eq!(svc.server().unwrap().name(), "rest");
    }

    #[test]
    fn serve_rejects_after_lifecycle_transitions() {
        let svc = service();
        svc.registry.lock().initialized = true;
        let err = svc.serve(MockServer::new("rest").into_ref()).unwrap_err();
        assert!(err.to_string().contains("must not be initialized"));

        let svc = service();
        svc.registry.lock().stopped = true;
        let err = svc.serve(MockServer::new("rest").into_ref()).unwrap_err();
        assert!(err.to_string().contains("must not be stopped"));
        assert!(svc.server().is_none());
    }

    #[test]
    fn attach_rejects_invalid_dependencies() {
        let svc = service();

        let err = svc.attach(None).unwrap_err();
        assert!(err.to_string().contains("Failed to attach dependency integration"));
        assert!(err.to_string().contains("Dependency must not be nil"));

        let err = svc.attach(MockDependency::new("").into_ref()).unwrap_err();
        assert!(err.to_string().contains("Dependency's name must be set"));
        assert!(svc.dependencies().is_empty());
    }

    #[test]
    fn attach_rejects_after_lifecycle_transitions() {
        let svc = service();
        svc.registry.lock().initialized = true;
        let err = svc.attach(MockDependency::new("postgres").into_ref()).unwrap_err();
        assert!(err.to_string().contains("must not be initialized"));

        let svc = service();
        svc.registry.lock().stopped = true;
        let err = svc.attach(MockDependency::new("postgres").into_ref()).unwrap_err();
        assert!(err.to_string().contains("must not be stopped"));
        assert!(svc.dependencies().is_empty());
    }

    #[test]
    fn attach_preserves_order_and_duplicates() {
        let svc = service();
        for name in ["alpha", "beta", "alpha", "gamma"] {
            svc.attach(MockDependency::new(name).into_ref()).unwrap();
        }

        let names: Vec<String> = svc
            .dependencies()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, ["alpha", "beta", "alpha", "gamma"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_attach_loses_no_updates() {
        let svc = service();
        let mut handles = Vec::new();
        for i in 0..64 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                let name = if i % 8 == 0 { String::new() } else { format!("dep-{i}") };
                svc.attach(MockDependency::new(&name).into_ref()).is_ok()
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 56);
        assert_eq!(svc.dependencies().len(), succeeded);
    }

    struct CountEvents(Arc<std::sync::atomic::AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CountEvents {
        fn on_event(
            &self,
            _event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[test]
    fn registration_logs_only_through_the_bus() {
        use tracing_subscriber::layer::SubscriberExt;

        let lines = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountEvents(Arc::clone(&lines)));

        tracing::subscriber::with_default(subscriber, || {
            let svc = service();
            svc.serve(MockServer::new("rest").into_ref()).unwrap();
            svc.attach(MockDependency::new("valkey").into_ref()).unwrap();
        });
        assert_eq!(lines.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn registration_publishes_events() {
        let svc = service();
        let mut rx = svc.subscribe();

        svc.serve(MockServer::new("rest").into_ref()).unwrap();
        svc.attach(MockDependency::new("valkey").into_ref()).unwrap();
        let _ = svc.attach(None);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::ServerRegistered);
        assert_eq!(first.integration.as_deref(), Some("rest"));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, EventKind::DependencyAttached);
        assert!(rx.try_recv().is_err());
    }
}
