//! # Integration registry.
//!
//! Holds the lifecycle flags, the single registered [`Server`](crate::Server)
//! and the ordered list of [`Dependency`](crate::Dependency) values behind
//! one exclusive lock.
//!
//! ## Rules
//! - At most one server; a second `serve` names the one already registered.
//! - Dependencies keep registration order; duplicates are allowed.
//! - No registration once initialized or stopped.
//! - The lock covers check-and-mutate sections only; it is never held across
//!   an `.await`.
//! - Rejections leave the state untouched.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ErrorStack, Validation};
use crate::events::{Bus, Event, EventKind};
use crate::integration::{DependencyRef, ServerRef};

/// Mutable lifecycle state.
#[derive(Default)]
pub(crate) struct State {
    /// `start` was accepted.
    pub(crate) initialized: bool,
    /// `stop` completed without failures.
    pub(crate) stopped: bool,
    pub(crate) server: Option<ServerRef>,
    pub(crate) dependencies: Vec<DependencyRef>,
}

/// Mutex-guarded registration bookkeeping.
pub(crate) struct Registry {
    state: Mutex<State>,
    bus: Bus,
}

impl Registry {
    pub(crate) fn new(bus: Bus) -> Self {
        Self {
            state: Mutex::new(State::default()),
            bus,
        }
    }

    /// Locks the state, ignoring poisoning (no critical section panics midway).
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers the service's server.
    pub(crate) fn serve(&self, server: Option<ServerRef>) -> Result<(), ErrorStack> {
        let rejected = |reason: Validation| -> Result<(), ErrorStack> {
            Err(ErrorStack::new("Failed to register server integration").with_validations([reason]))
        };

        let mut state = self.lock();
        if state.initialized {
            return rejected(Validation::new(
                "Service must not be initialized for registering a server",
            ));
        }
        if state.stopped {
            return rejected(Validation::new(
                "Service must not be stopped for registering a server",
            ));
        }
        let Some(server) = server else {
            return rejected(Validation::new("Server must not be nil"));
        };
        if server.name().is_empty() {
            return rejected(
                Validation::new("Server's name must be set and not be empty")
                    .at(["server.name()"]),
            );
        }
        if let Some(current) = &state.server {
            return rejected(Validation::new(format!(
                "A server integration has already been registered ({}). A service can only have one server",
                current.name()
            )));
        }

        let name = server.name().to_owned();
        state.server = Some(server);
        drop(state);

        self.bus
            .publish(Event::new(EventKind::ServerRegistered).with_integration(name));
        Ok(())
    }

    /// Attaches a dependency, after any previously attached one.
    pub(crate) fn attach(&self, dependency: Option<DependencyRef>) -> Result<(), ErrorStack> {
        let rejected = |reason: Validation| -> Result<(), ErrorStack> {
            Err(ErrorStack::new("Failed to attach dependency integration")
                .with_validations([reason]))
        };

        let mut state = self.lock();
        if state.initialized {
            return rejected(Validation::new(
                "Service must not be initialized for attaching a dependency",
            ));
        }
        if state.stopped {
            return rejected(Validation::new(
                "Service must not be stopped for attaching a dependency",
            ));
        }
        let Some(dependency) = dependency else {
            return rejected(Validation::new("Dependency must not be nil"));
        };
        if dependency.name().is_empty() {
            return rejected(
                Validation::new("Dependency's name must be set and not be empty")
                    .at(["dependency.name()"]),
            );
        }

        let name = dependency.name().to_owned();
        state.dependencies.push(dependency);
        drop(state);

        self.bus
            .publish(Event::new(EventKind::DependencyAttached).with_integration(name));
        Ok(())
    }

    pub(crate) fn server(&self) -> Option<ServerRef> {
        self.lock().server.clone()
    }

    pub(crate) fn dependencies(&self) -> Vec<DependencyRef> {
        self.lock().dependencies.clone()
    }

    /// Snapshot of every registered participant.
    pub(crate) fn participants(&self) -> (Option<ServerRef>, Vec<DependencyRef>) {
        let state = self.lock();
        (state.server.clone(), state.dependencies.clone())
    }
}
