//! # Start and stop.
//!
//! ```text
//! start(ctx)
//!   ├─ lock: reject initialized | stopped | no server | no signals
//!   ├─ lock: register signal listener, initialized = true
//!   ├─ spawn(server.start(ctx))
//!   └─ select! ─┬─ signal        ─► Ok(())
//!               └─ server error  ─► Err(stack + child)
//!
//! stop(ctx)
//!   ├─ lock: reject !initialized | stopped, snapshot participants
//!   ├─ server.stop(ctx)                       (strictly first)
//!   ├─ JoinSet: dependency.close(ctx) × N     (unordered)
//!   └─ children? ─┬─ yes ─► Err(stack), still stoppable
//!                 └─ no  ─► stopped = true
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::service::Service;
use super::shutdown::ShutdownListener;
use crate::error::{BoxError, ErrorStack, Validation};
use crate::events::{Event, EventKind};
use crate::subscribers::panic_message;

impl Service {
    /// Starts the registered server and blocks until the service should stop.
    ///
    /// Returns `Ok(())` once a configured shutdown signal is received, or the
    /// server's error wrapped as a child when its `start` fails first. A server
    /// whose `start` returns `Ok(())` early does not end the wait.
    ///
    /// The service is marked initialized before waiting, so registration is
    /// rejected from this point on.
    pub async fn start(&self, ctx: CancellationToken) -> Result<(), ErrorStack> {
        let stack = ErrorStack::new("Failed to initialize the service");

        let (server, mut listener) = {
            let mut state = self.registry.lock();
            if state.initialized {
                return Err(
                    stack.with_validations([Validation::new("Service has already been initialized")])
                );
            }
            if state.stopped {
                return Err(
                    stack.with_validations([Validation::new("Cannot initialize a stopped service")])
                );
            }
            let Some(server) = state.server.clone() else {
                return Err(stack.with_validations([Validation::new(
                    "Service must have a server registered via Serve before starting",
                )]));
            };

            if self.cfg.shutdown_signals.is_empty() {
                return Err(stack.with_validations([Validation::new(
                    "At least one shutdown signal must be configured for starting",
                )
                .at(["Config", "shutdown_signals"])]));
            }
            let listener = match ShutdownListener::listen(&self.cfg.shutdown_signals) {
                Ok(listener) => listener,
                Err(err) => {
                    error!(service = %self.cfg.name, error = %err, "failed to register shutdown signals");
                    return Err(stack.with_children([err]));
                }
            };
            state.initialized = true;
            (server, listener)
        };

        let name = server.name().to_owned();
        self.bus
            .publish(Event::new(EventKind::ServiceStarting).with_integration(name.as_str()));

        let handle = tokio::spawn({
            let server = Arc::clone(&server);
            async move { server.start(ctx).await }
        });

        let failure = async {
            match handle.await {
                Ok(Ok(())) => {
                    self.bus
                        .publish(Event::new(EventKind::ServerExited).with_integration(name.as_str()));
                    std::future::pending::<BoxError>().await
                }
                Ok(Err(err)) => err,
                Err(join) => BoxError::from(join),
            }
        };

        tokio::select! {
            signal = listener.recv() => {
                self.bus
                    .publish(Event::new(EventKind::ShutdownRequested).with_reason(signal.as_str()));
                Ok(())
            }
            err = failure => {
                self.bus.publish(
                    Event::new(EventKind::ServerFailed)
                        .with_integration(name.as_str())
                        .with_reason(err.to_string()),
                );
                Err(stack.with_children([err]))
            }
        }
    }

    /// Gracefully stops the server, then closes every dependency concurrently.
    ///
    /// Every failure is collected as a child. When any occurred the service is
    /// left unstopped, so `stop` can be called again; that retry closes every
    /// dependency once more, including those that closed fine the first time.
    pub async fn stop(&self, ctx: CancellationToken) -> Result<(), ErrorStack> {
        let _gate = self.stop_gate.lock().await;
        let mut stack = ErrorStack::new("Failed to gracefully close service's connections");

        let (server, dependencies) = {
            let state = self.registry.lock();
            if !state.initialized {
                return Err(
                    stack.with_validations([Validation::new("Service must first be initialized")])
                );
            }
            if state.stopped {
                return Err(
                    stack.with_validations([Validation::new("Service has already been stopped")])
                );
            }
            (state.server.clone(), state.dependencies.clone())
        };

        self.bus.publish(Event::new(EventKind::ServiceStopping));

        if let Some(server) = server {
            let name = server.name().to_owned();
            match guarded(&name, server.stop(ctx.clone())).await {
                Ok(()) => {
                    self.bus
                        .publish(Event::new(EventKind::ServerStopped).with_integration(name));
                }
                Err(err) => {
                    self.close_failed(&name, &err);
                    stack.push_child(err);
                }
            }
        }

        let mut set = JoinSet::new();
        for dependency in dependencies {
            let ctx = ctx.clone();
            set.spawn(async move {
                let name = dependency.name().to_owned();
                let result = guarded(&name, dependency.close(ctx)).await;
                (name, result)
            });
        }
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    self.bus
                        .publish(Event::new(EventKind::DependencyClosed).with_integration(name));
                }
                Ok((name, Err(err))) => {
                    self.close_failed(&name, &err);
                    stack.push_child(err);
                }
                Err(join) => {
                    error!(service = %self.cfg.name, error = %join, "dependency close task failed");
                    stack.push_child(join);
                }
            }
        }

        if stack.has_children() {
            let failures = stack.children().len();
            self.bus.publish(
                Event::new(EventKind::StopFailed).with_reason(format!("{failures} failure(s)")),
            );
            return Err(stack);
        }

        self.registry.lock().stopped = true;
        self.bus.publish(Event::new(EventKind::ServiceStopped));
        Ok(())
    }

    fn close_failed(&self, name: &str, err: &BoxError) {
        self.bus.publish(
            Event::new(EventKind::CloseFailed)
                .with_integration(name)
                .with_reason(err.to_string()),
        );
    }
}

/// Awaits an integration call, turning a panic into an error.
pub(super) async fn guarded<F, T>(name: &str, call: F) -> Result<T, BoxError>
where
    F: Future<Output = Result<T, BoxError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(panicked(name, panic).into()),
    }
}

pub(super) fn panicked(name: &str, panic: Box<dyn Any + Send>) -> ErrorStack {
    ErrorStack::new(format!("Integration {name} panicked"))
        .with_validations([Validation::new(panic_message(&*panic))])
}
