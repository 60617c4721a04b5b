//! # servicevisor
//!
//! **Servicevisor** is a lifecycle shell for backend services.
//!
//! A service owns exactly one inbound [`Server`] (REST, GraphQL, a workflow
//! worker, ...) and any number of outbound [`Dependency`] connections
//! (databases, caches, buckets, ...). The crate starts the server, waits for a
//! shutdown signal, drains the server before closing every dependency, and
//! reduces everyone's health to one HTTP-shaped status. Every failure along
//! the way is reported as a structured [`ErrorStack`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Server    │   │  Dependency  │   │  Dependency  │
//!     │   ("rest")   │   │ ("postgres") │   │  ("valkey")  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ serve()          │ attach()         │ attach()
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Service (runtime shell)                                          │
//! │  - Registry (flags, server, ordered dependencies; one lock)       │
//! │  - start(): signal listener vs. server.start() race               │
//! │  - stop():  server.stop() then concurrent dependency.close()      │
//! │  - status(): concurrent fan-out, worst code wins                  │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   │ publishes
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                   (capacity: Config::bus_capacity)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    LogWriter   metrics    custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Uninitialized ──start()──► Initialized ──stop()──► Stopped
//!       ▲ serve/attach            │ stop() failed
//!       │ allowed only here       └──► stays Initialized, stop() may be retried
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                     |
//! |-------------------|--------------------------------------------------------------|----------------------------------------|
//! | **Integrations**  | Plug servers and dependencies into the lifecycle.            | [`Server`], [`Dependency`], [`Health`] |
//! | **Lifecycle**     | Start, signal handling, graceful stop, composite health.     | [`Service`], [`HealthReport`]          |
//! | **Errors**        | Message, validations with paths, nested causes, JSON form.   | [`ErrorStack`], [`Validation`]         |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, alerting).     | [`Subscribe`], [`LogWriter`]           |
//! | **Configuration** | Centralize runtime settings, loadable from the environment.  | [`Config`], [`SignalSet`]              |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use servicevisor::{BoxError, Config, Health, LogWriter, Server, ServerRef, Service};
//!
//! struct Api;
//!
//! #[async_trait]
//! impl Server for Api {
//!     fn name(&self) -> &str { "rest" }
//!     async fn start(&self, ctx: CancellationToken) -> Result<(), BoxError> {
//!         ctx.cancelled().await;
//!         Ok(())
//!     }
//!     async fn stop(&self, _ctx: CancellationToken) -> Result<(), BoxError> { Ok(()) }
//!     async fn status(&self, _ctx: CancellationToken) -> Health { Health::healthy() }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::from_env()?;
//!     servicevisor::init_logging(&cfg);
//!
//!     let service = Service::builder(cfg)
//!         .with_subscriber(Arc::new(LogWriter::new()))
//!         .build();
//!
//!     let api: ServerRef = Arc::new(Api);
//!     service.serve(api)?;
//!
//!     // Blocks until SIGINT/SIGTERM or a server failure.
//!     let ctx = CancellationToken::new();
//!     service.start(ctx.clone()).await?;
//!
//!     ctx.cancel();
//!     service.stop(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod integration;
mod logging;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use core::{Config, HealthReport, ParseSignalError, Service, ServiceBuilder, Signal, SignalSet};
pub use error::{BoxError, ErrorStack, Validation};
pub use events::{Bus, Event, EventKind};
pub use integration::{Dependency, DependencyRef, Health, Server, ServerRef};
pub use logging::init_logging;
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
