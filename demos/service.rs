//! # Example: ticker service with a cache dependency
//!
//! Runs a server that "handles" a request every 500ms until Ctrl-C, then
//! drains it and closes the cache. The cache reports itself degraded after a
//! few requests, which shows up in the periodic health report.
//!
//! ```text
//! cargo run --example service
//! SERVICE_LOG_JSON=true cargo run --example service
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use servicevisor::{
    BoxError, Config, Dependency, DependencyRef, Health, LogWriter, Server, ServerRef, Service,
};

struct Cache {
    hits: AtomicU64,
}

#[async_trait]
impl Dependency for Cache {
    fn name(&self) -> &str {
        "cache"
    }

    async fn close(&self, _ctx: CancellationToken) -> Result<(), BoxError> {
        println!("[cache] flushed {} entries", self.hits.load(Ordering::Relaxed));
        Ok(())
    }

    async fn status(&self, _ctx: CancellationToken) -> Health {
        let hits = self.hits.load(Ordering::Relaxed);
        if hits > 5 {
            return Health::unavailable(format!("cache: eviction storm after {hits} hits"));
        }
        Health::healthy()
    }
}

struct Ticker {
    cache: Arc<Cache>,
    served: AtomicU64,
}

#[async_trait]
impl Server for Ticker {
    fn name(&self) -> &str {
        "ticker"
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        let mut every = tokio::time::interval(Duration::from_millis(500));
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                _ = every.tick() => {
                    let n = self.served.fetch_add(1, Ordering::Relaxed) + 1;
                    self.cache.hits.fetch_add(1, Ordering::Relaxed);
                    println!("[ticker] request #{n}");
                }
            }
        }
    }

    async fn stop(&self, _ctx: CancellationToken) -> Result<(), BoxError> {
        println!("[ticker] drained after {} requests", self.served.load(Ordering::Relaxed));
        Ok(())
    }

    async fn status(&self, _ctx: CancellationToken) -> Health {
        Health::healthy()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env()?;
    servicevisor::init_logging(&cfg);

    let service = Service::builder(cfg)
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();

    let cache = Arc::new(Cache {
        hits: AtomicU64::new(0),
    });
    let ticker: ServerRef = Arc::new(Ticker {
        cache: Arc::clone(&cache),
        served: AtomicU64::new(0),
    });
    let dependency: DependencyRef = cache;

    service.serve(ticker)?;
    service.attach(dependency)?;

    let probe = tokio::spawn({
        let service = Arc::clone(&service);
        async move {
            let mut every = tokio::time::interval(Duration::from_secs(2));
            loop {
                every.tick().await;
                let report = service.status(CancellationToken::new()).await;
                println!("[health] {}", serde_json::to_string(&report).unwrap_or_default());
            }
        }
    });

    let ctx = CancellationToken::new();
    let started = service.start(ctx.clone()).await;
    ctx.cancel();
    probe.abort();

    if let Err(err) = started {
        eprintln!("{err}");
    }
    service.stop(CancellationToken::new()).await?;
    Ok(())
}
