//! Eviction Task
//!
//! One-shot background task that clears a cached value once its TTL elapses.

use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Runtime that eviction tasks are spawned on.
///
/// Captured once when a cache is built, so later calls work from any thread,
/// including threads that are not part of a tokio runtime.
#[derive(Debug, Clone)]
pub struct Scheduler {
    handle: Handle,
}

impl Scheduler {
    /// Uses the multi-threaded tokio runtime of the calling context.
    ///
    /// A current-thread runtime only makes progress while its owner drives
    /// it, so in that case, and outside any runtime, tasks go to a shared
    /// background runtime with a single worker thread instead. That runtime
    /// is started the first time it is needed.
    ///
    /// # Panics
    /// Panics if the background runtime is needed and cannot be started,
    /// e.g. because the OS refuses to spawn its worker thread.
    pub fn current() -> Self {
        let handle = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => handle,
            Ok(_) => {
                debug!("Current-thread runtime in scope, using the background timer runtime");
                background_runtime().handle().clone()
            }
            Err(_) => {
                debug!("No tokio runtime in scope, using the background timer runtime");
                background_runtime().handle().clone()
            }
        };
        Self { handle }
    }

    /// Uses an explicit runtime handle.
    ///
    /// The caller is responsible for keeping that runtime driven; a
    /// current-thread runtime only fires timers while it is being polled.
    pub fn from_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawns a task that runs `evict` once `after` has elapsed.
    ///
    /// The returned handle can be aborted at any time before the task fires;
    /// aborting a finished task does nothing. If the captured runtime has
    /// already shut down, the task is moved to the background runtime.
    ///
    /// # Panics
    /// Panics if the background runtime is needed and cannot be started.
    ///
    /// # Example
    /// ```ignore
    /// let handle = scheduler.spawn_eviction(Duration::from_secs(1), || clear());
    /// // Later, when the value is replaced:
    /// handle.abort();
    /// ```
    pub fn spawn_eviction<F>(&self, after: Duration, evict: F) -> JoinHandle<()>
    where
        F: FnOnce() + Clone + Send + 'static,
    {
        let handle = self.handle.spawn(evict_after(after, evict.clone()));
        // A runtime that is shutting down cancels new tasks on the spot
        if !handle.is_finished() {
            return handle;
        }

        warn!("Captured runtime has shut down, moving eviction to the background timer runtime");
        background_runtime().spawn(evict_after(after, evict))
    }
}

fn evict_after<F>(after: Duration, evict: F) -> impl Future<Output = ()> + Send + 'static
where
    F: FnOnce() + Send + 'static,
{
    async move {
        tokio::time::sleep(after).await;
        evict();
    }
}

fn background_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| {
        Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("ttl-cell-timer")
            .enable_time()
            .build()
            .expect("Failed to start the eviction timer runtime")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};

    #[tokio::test(start_paused = true)]
    async fn test_eviction_runs_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let scheduler = Scheduler::from_handle(Handle::current());
        let _handle = scheduler.spawn_eviction(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0, "Should not fire early");

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1, "Should fire exactly once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_eviction_never_runs() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let scheduler = Scheduler::from_handle(Handle::current());
        let handle = scheduler.spawn_eviction(Duration::from_millis(50), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.abort();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(handle.is_finished(), "Task should be finished after abort");

        // Aborting again is harmless
        handle.abort();
    }

    #[test]
    fn test_background_runtime_outside_tokio() {
        let (tx, rx) = mpsc::channel();

        let _handle = Scheduler::current().spawn_eviction(Duration::from_millis(10), move || {
            let _ = tx.send(());
        });

        assert!(
            rx.recv_timeout(Duration::from_secs(5)).is_ok(),
            "Background runtime should run the task"
        );
    }
}
