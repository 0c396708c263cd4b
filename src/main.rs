//! ttl_cell demo
//!
//! Runs the same TTL scenario against every cache variant, then hammers a
//! shared cache with concurrent updates.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use parking_lot::Mutex;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cell::{Cache, Config, CustomCache, SafeCache, ValueCache};

/// TTL used by the expiry walkthrough, short enough to watch.
const DEMO_TTL: Duration = Duration::from_millis(200);

/// Longest TTL the demo backend accepts.
const MAX_BACKEND_TTL: Duration = Duration::from_secs(3600);

/// Updates applied by each concurrent worker.
const UPDATES_PER_WORKER: u64 = 100;

/// Concurrent workers when `CACHE_DEMO_WORKERS` is unset.
const DEFAULT_DEMO_WORKERS: usize = 8;

/// Entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Run the demo until it finishes or Ctrl+C is received
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cell=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ttl_cell demo");

    let config = Config::try_from_env().context("Failed to load configuration")?;
    let workers = demo_workers()?;
    info!(
        "Configuration loaded: default_ttl={:?}, demo_workers={}",
        config.default_ttl, workers
    );

    tokio::select! {
        result = run_demo(&config, workers) => result?,
        _ = shutdown_signal() => warn!("Demo interrupted"),
    }

    info!("Demo complete");
    Ok(())
}

/// Reads `CACHE_DEMO_WORKERS`, the number of tasks sharing the counter.
fn demo_workers() -> anyhow::Result<usize> {
    match std::env::var("CACHE_DEMO_WORKERS") {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid CACHE_DEMO_WORKERS={}", raw)),
        Err(_) => Ok(DEFAULT_DEMO_WORKERS),
    }
}

async fn run_demo(config: &Config, workers: usize) -> anyhow::Result<()> {
    let mut core = Cache::<String>::new(DEMO_TTL);
    walkthrough("core", &mut core).await;

    let mut safe = SafeCache::<String>::new(DEMO_TTL);
    walkthrough("safe", &mut safe).await;

    let mut custom = deadline_cache::<String>(DEMO_TTL)?;
    walkthrough("custom", &mut custom).await;

    // Shared counter under concurrent updates
    let counter = Arc::new(SafeCache::<u64>::from_config(config));
    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let counter = counter.clone();
            tokio::spawn(async move {
                for _ in 0..UPDATES_PER_WORKER {
                    counter.update(|n| n + 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.context("Worker task failed")?;
    }

    info!(
        count = counter.get(),
        expected = workers as u64 * UPDATES_PER_WORKER,
        "Concurrent updates applied"
    );

    let rejected = counter.try_update(|n| {
        if n > 0 {
            Err(format!("refusing to reset a live count of {}", n))
        } else {
            Ok(0)
        }
    });
    if let Err(reason) = rejected {
        warn!(%reason, count = counter.get(), "Update rejected, count unchanged");
    }

    let stats = serde_json::to_string(&counter.stats()).context("Failed to encode stats")?;
    info!("Counter stats: {}", stats);

    Ok(())
}

/// Set, extend once, then let the value expire.
async fn walkthrough<C: ValueCache<String>>(label: &str, cache: &mut C) {
    cache.set(format!("{} value", label));
    info!(cache = label, value = %cache.get(), "Value stored");

    tokio::time::sleep(DEMO_TTL / 2).await;
    cache.reset_timer();

    tokio::time::sleep(DEMO_TTL * 3 / 4).await;
    info!(cache = label, value = %cache.get(), "Still cached after timer reset");

    tokio::time::sleep(DEMO_TTL / 2).await;
    info!(cache = label, value = ?cache.get(), "Value after TTL elapsed");
}

// == Deadline Backend ==
/// Value plus an optional deadline, checked lazily on access.
#[derive(Debug, Default)]
struct Deadline<T> {
    value: T,
    expires_at: Option<Instant>,
}

impl<T: Clone + Default> Deadline<T> {
    /// Drops the value once its deadline has passed.
    fn expire(&mut self) {
        if self.expires_at.is_some_and(|deadline| Instant::now() >= deadline) {
            self.value = T::default();
            self.expires_at = None;
        }
    }

    fn current(&mut self) -> T {
        self.expire();
        self.value.clone()
    }

    /// Restarts the TTL; a value past its deadline is dropped first.
    fn restart(&mut self, ttl: Duration) {
        self.expire();
        self.expires_at = deadline_after(ttl);
    }
}

fn deadline_after(ttl: Duration) -> Option<Instant> {
    (!ttl.is_zero()).then(|| Instant::now() + ttl)
}

/// A custom cache that expires values by deadline instead of by timer task.
fn deadline_cache<T>(ttl: Duration) -> anyhow::Result<CustomCache<T>>
where
    T: Clone + Default + Send + 'static,
{
    let state = Arc::new(Mutex::new(Deadline::<T>::default()));
    let (set, get, reset, stop) = (state.clone(), state.clone(), state.clone(), state);

    let cache = CustomCache::builder(ttl)
        .on_set(move |value, ttl| {
            let mut slot = set.lock();
            slot.value = value;
            slot.expires_at = deadline_after(ttl);
        })
        .on_get(move || get.lock().current())
        .on_set_duration(|requested| requested.min(MAX_BACKEND_TTL))
        .on_reset_timer(move |ttl| reset.lock().restart(ttl))
        .on_stop_timer(move || {
            let mut slot = stop.lock();
            slot.expire();
            slot.expires_at = None;
        })
        .build()?;

    Ok(cache)
}

/// Waits for Ctrl+C.
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating shutdown...");
}
