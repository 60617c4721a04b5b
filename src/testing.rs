//! Configurable `Server` / `Dependency` doubles for the crate's tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;
use crate::integration::{Dependency, DependencyRef, Health, Server, ServerRef};

/// Shared, ordered record of `stop:<name>` / `close:<name>` calls.
pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

pub(crate) fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// What `MockServer::start` does.
#[derive(Clone, Copy)]
pub(crate) enum StartBehavior {
    /// Runs until `ctx` is cancelled.
    Block,
    /// Returns the message as an error after a short delay.
    Fail(&'static str),
    /// Returns `Ok(())` immediately.
    Exit,
    Panic,
}

#[derive(Clone)]
struct Status {
    code: u16,
    error: Option<String>,
    panic: bool,
}

impl Status {
    fn health(&self, name: &str) -> Health {
        if self.panic {
            panic!("{name} status exploded");
        }
        let health = Health::new(self.code);
        match &self.error {
            Some(msg) => health.with_error(msg.clone()),
            None => health,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self {
            code: Health::OK,
            error: None,
            panic: false,
        }
    }
}

pub(crate) struct MockServer {
    name: String,
    start: StartBehavior,
    status: Status,
    stop_failures: AtomicUsize,
    stop_delay: Duration,
    journal: Journal,
    pub(crate) starts: AtomicUsize,
    pub(crate) stops: AtomicUsize,
}

impl MockServer {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: StartBehavior::Block,
            status: Status::default(),
            stop_failures: AtomicUsize::new(0),
            stop_delay: Duration::ZERO,
            journal: journal(),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_start(mut self, start: StartBehavior) -> Self {
        self.start = start;
        self
    }

    pub(crate) fn with_status(mut self, code: u16, error: Option<&str>) -> Self {
        self.status.code = code;
        self.status.error = error.map(str::to_string);
        self
    }

    pub(crate) fn panicking_status(mut self) -> Self {
        self.status.panic = true;
        self
    }

    /// The next `times` calls to `stop` fail.
    pub(crate) fn failing_stop(self, times: usize) -> Self {
        self.stop_failures.store(times, Ordering::SeqCst);
        self
    }

    /// Makes `stop` take a while, to expose ordering bugs.
    pub(crate) fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    pub(crate) fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Arc::clone(journal);
        self
    }

    pub(crate) fn into_ref(self) -> ServerRef {
        Arc::new(self)
    }
}

#[async_trait]
impl Server for MockServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        match self.start {
            StartBehavior::Block => {
                ctx.cancelled().await;
                Ok(())
            }
            StartBehavior::Fail(msg) => {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err(msg.into())
            }
            StartBehavior::Exit => Ok(()),
            StartBehavior::Panic => panic!("{} start exploded", self.name),
        }
    }

    async fn stop(&self, _ctx: CancellationToken) -> Result<(), BoxError> {
        tokio::time::sleep(self.stop_delay).await;
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().unwrap().push(format!("stop:{}", self.name));
        if take_failure(&self.stop_failures) {
            return Err(format!("{} refused to stop", self.name).into());
        }
        Ok(())
    }

    async fn status(&self, _ctx: CancellationToken) -> Health {
        self.status.health(&self.name)
    }
}

pub(crate) struct MockDependency {
    name: String,
    status: Status,
    close_failures: AtomicUsize,
    journal: Journal,
    pub(crate) closes: AtomicUsize,
}

impl MockDependency {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: Status::default(),
            close_failures: AtomicUsize::new(0),
            journal: journal(),
            closes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_status(mut self, code: u16, error: Option<&str>) -> Self {
        self.status.code = code;
        self.status.error = error.map(str::to_string);
        self
    }

    pub(crate) fn panicking_status(mut self) -> Self {
        self.status.panic = true;
        self
    }

    /// The next `times` calls to `close` fail.
    pub(crate) fn failing_close(self, times: usize) -> Self {
        self.close_failures.store(times, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Arc::clone(journal);
        self
    }

    pub(crate) fn into_ref(self) -> DependencyRef {
        Arc::new(self)
    }
}

#[async_trait]
impl Dependency for MockDependency {
    fn name(&self) -> &str {
        &self.name
    }

    async fn close(&self, _ctx: CancellationToken) -> Result<(), BoxError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.journal.lock().unwrap().push(format!("close:{}", self.name));
        if take_failure(&self.close_failures) {
            return Err(format!("{} connection reset", self.name).into());
        }
        Ok(())
    }

    async fn status(&self, _ctx: CancellationToken) -> Health {
        self.status.health(&self.name)
    }
}

fn take_failure(remaining: &AtomicUsize) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}
