//! # Process-wide `tracing` setup.
//!
//! [`init_logging`] installs a `tracing-subscriber` registry with an
//! [`EnvFilter`] (from `RUST_LOG`, else [`Config::log_level`]) and either a
//! human-readable or a JSON formatting layer. It runs at most once per
//! process; an already installed global subscriber is left in place.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::Config;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Installs the global `tracing` subscriber described by `cfg`.
pub fn init_logging(cfg: &Config) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&cfg.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let json = cfg.log_json.then(|| fmt::layer().with_target(true).json());
        let human = (!cfg.log_json).then(|| fmt::layer().with_target(true));

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(json)
            .with(human)
            .try_init();
        if installed.is_err() {
            tracing::debug!("global tracing subscriber already set, keeping it");
        }

        tracing::debug!(
            service = %cfg.name,
            json = cfg.log_json,
            "logging initialized"
        );
    });
}
