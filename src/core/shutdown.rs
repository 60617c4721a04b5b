//! # Cross-platform OS shutdown signals.
//!
//! [`Signal`] names the signals that end [`Service::start`](crate::Service::start);
//! [`SignalSet`] is the configurable list of them. The listener is created
//! synchronously (so registration failures surface before the service is
//! marked initialized) and awaited afterwards.
//!
//! ## Signals
//! **Unix platforms:** any of `SIGINT`, `SIGTERM`, `SIGQUIT`, `SIGHUP`.
//!
//! **Other platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`], whatever the set.

use std::fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;

/// A termination signal the service listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT` (Ctrl-C in a terminal).
    Interrupt,
    /// `SIGTERM` (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "interrupt",
            Signal::Terminate => "terminate",
            Signal::Quit => "quit",
            Signal::Hangup => "hangup",
        }
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown signal name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shutdown signal `{0}`, expected one of interrupt, terminate, quit, hangup")]
pub struct ParseSignalError(pub String);

impl FromStr for Signal {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "interrupt" | "int" | "sigint" => Ok(Signal::Interrupt),
            "terminate" | "term" | "sigterm" => Ok(Signal::Terminate),
            "quit" | "sigquit" => Ok(Signal::Quit),
            "hangup" | "hup" | "sighup" => Ok(Signal::Hangup),
            other => Err(ParseSignalError(other.to_string())),
        }
    }
}

/// Ordered, de-duplicated list of shutdown signals.
///
/// Parses from a comma-separated list: `"interrupt,terminate"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSet(Vec<Signal>);

impl SignalSet {
    pub fn new<I>(signals: I) -> Self
    where
        I: IntoIterator<Item = Signal>,
    {
        let mut set = Vec::new();
        for signal in signals {
            if !set.contains(&signal) {
                set.push(signal);
            }
        }
        Self(set)
    }

    pub fn signals(&self) -> &[Signal] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SignalSet {
    /// `SIGINT` and `SIGTERM`.
    fn default() -> Self {
        Self(vec![Signal::Interrupt, Signal::Terminate])
    }
}

impl FromStr for SignalSet {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Signal::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

/// Registered listener for a [`SignalSet`].
#[cfg(unix)]
pub(crate) struct ShutdownListener {
    streams: Vec<(Signal, tokio::signal::unix::Signal)>,
}

#[cfg(unix)]
impl ShutdownListener {
    /// Registers the OS handlers. Must be called from within a Tokio runtime.
    pub(crate) fn listen(set: &SignalSet) -> io::Result<Self> {
        let streams = set
            .signals()
            .iter()
            .map(|&signal| -> io::Result<_> {
                Ok((signal, tokio::signal::unix::signal(signal.kind())?))
            })
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self { streams })
    }

    /// Waits for the first signal of the set. Never completes for an empty set.
    pub(crate) async fn recv(&mut self) -> Signal {
        if self.streams.is_empty() {
            return std::future::pending().await;
        }
        let waits = self.streams.iter_mut().map(|(signal, stream)| {
            Box::pin(async move {
                stream.recv().await;
                *signal
            })
        });
        futures::future::select_all(waits).await.0
    }
}

#[cfg(not(unix))]
pub(crate) struct ShutdownListener;

#[cfg(not(unix))]
impl ShutdownListener {
    pub(crate) fn listen(_set: &SignalSet) -> io::Result<Self> {
        Ok(Self)
    }

    pub(crate) async fn recv(&mut self) -> Signal {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Signal::Interrupt,
            Err(_) => std::future::pending().await,
        }
    }
}
