//! # Service runtime configuration.
//!
//! [`Config`] centralizes the settings of the runtime shell itself (not of
//! individual integrations, which own their configuration).
//!
//! Config can be built in two ways:
//! 1. **In code**: `Config::default()` and field overrides;
//! 2. **From the environment**: [`Config::from_env`], backed by `envconfig`.
//!
//! ## Environment
//! | Variable                   | Default                | Field              |
//! |----------------------------|------------------------|--------------------|
//! | `SERVICE_NAME`             | `service`              | `name`             |
//! | `SERVICE_BUS_CAPACITY`     | `1024`                 | `bus_capacity`     |
//! | `SERVICE_SHUTDOWN_SIGNALS` | `interrupt,terminate`  | `shutdown_signals` |
//! | `SERVICE_LOG_LEVEL`        | `info`                 | `log_level`        |
//! | `SERVICE_LOG_JSON`         | `false`                | `log_json`         |
//!
//! ## Sentinel values
//! - `bus_capacity = 0` is rejected by [`Config::validate`] and clamped to 1 by the bus.

use std::collections::HashMap;

use envconfig::Envconfig;

use super::shutdown::SignalSet;
use crate::error::{ErrorStack, Validation};

/// Global configuration for the service runtime.
#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    /// Service name, used in logs.
    #[envconfig(from = "SERVICE_NAME", default = "service")]
    pub name: String,

    /// Capacity of the lifecycle event bus ring buffer.
    ///
    /// Receivers lagging behind by more than this many events skip the oldest ones.
    #[envconfig(from = "SERVICE_BUS_CAPACITY", default = "1024")]
    pub bus_capacity: usize,

    /// Signals that end [`Service::start`](crate::Service::start).
    #[envconfig(from = "SERVICE_SHUTDOWN_SIGNALS", default = "interrupt,terminate")]
    pub shutdown_signals: SignalSet,

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    #[envconfig(from = "SERVICE_LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    #[envconfig(from = "SERVICE_LOG_JSON", default = "false")]
    pub log_json: bool,
}

impl Config {
    /// Loads and validates the configuration from the process environment.
    pub fn from_env() -> Result<Self, ErrorStack> {
        let cfg = Self::init_from_env().map_err(load_error)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads and validates the configuration from a map of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ErrorStack> {
        let cfg = Self::init_from_hashmap(vars).map_err(load_error)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks field invariants, reporting every violation at once.
    pub fn validate(&self) -> Result<(), ErrorStack> {
        let mut stack = ErrorStack::new("Failed to validate service configuration");

        if self.name.trim().is_empty() {
            stack.push_validation(
                Validation::new("Service name must be set and not be empty")
                    .at(["Config", "name"]),
            );
        }
        if self.bus_capacity == 0 {
            stack.push_validation(
                Validation::new("Event bus capacity must be at least 1")
                    .at(["Config", "bus_capacity"]),
            );
        }
        if self.shutdown_signals.is_empty() {
            stack.push_validation(
                Validation::new("At least one shutdown signal must be configured")
                    .at(["Config", "shutdown_signals"]),
            );
        }

        if stack.has_validations() {
            return Err(stack);
        }
        Ok(())
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

fn load_error(err: envconfig::Error) -> ErrorStack {
    ErrorStack::new("Failed to load service configuration from environment")
        .with_validations([Validation::new(err.to_string())])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "service".to_string(),
            bus_capacity: 1024,
            shutdown_signals: SignalSet::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}
