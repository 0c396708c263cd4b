//! Thread-Safe Cache Module
//!
//! Shares one cached value between threads and adds atomic
//! read-modify-write updates.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheStats, ValueCache};
use crate::config::Config;
use crate::tasks::Scheduler;

// == Safe Cache ==
/// A [`Cache`] whose operations all take `&self`.
///
/// Every operation, and the eviction task, holds the same exclusive lock for
/// its whole duration. Concurrent calls are therefore applied one at a time
/// and `get` never sees a value being expired underneath it.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ttl_cell::SafeCache;
///
/// let counter = Arc::new(SafeCache::with_value(Duration::from_secs(60), 0u64));
/// counter.update(|n| n + 1);
/// assert_eq!(counter.get(), 1);
/// ```
#[derive(Debug)]
pub struct SafeCache<T> {
    inner: Cache<T>,
}

impl<T> SafeCache<T>
where
    T: Clone + Default + Send + 'static,
{
    // == Constructors ==
    /// Creates an empty cache whose values live for `duration`, zero for never.
    ///
    /// # Panics
    /// Panics if the background timer runtime is needed and cannot be started.
    pub fn new(duration: Duration) -> Self {
        Self {
            inner: Cache::new(duration),
        }
    }

    /// Creates a cache holding `value`, with its timer already running.
    pub fn with_value(duration: Duration, value: T) -> Self {
        Self {
            inner: Cache::with_value(duration, value),
        }
    }

    /// Creates an empty cache whose timers run on `scheduler`.
    pub fn new_in(scheduler: Scheduler, duration: Duration) -> Self {
        Self {
            inner: Cache::new_in(scheduler, duration),
        }
    }

    /// Creates an empty cache using the configured default TTL.
    pub fn from_config(config: &Config) -> Self {
        Self {
            inner: Cache::from_config(config),
        }
    }

    // == Contract ==
    /// Stores `value`, replacing any pending eviction with a fresh one.
    pub fn set(&self, value: T) {
        self.inner.shared().lock().store(value);
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.inner.shared().lock().value()
    }

    /// Sets the TTL for the next `set`, `update` or `reset_timer` call.
    pub fn set_duration(&self, duration: Duration) {
        self.inner.shared().lock().set_duration(duration);
    }

    /// Restarts the TTL without touching the value.
    pub fn reset_timer(&self) {
        self.inner.shared().lock().reset_timer();
    }

    /// Cancels the pending eviction, if any.
    pub fn stop_timer(&self) {
        self.inner.shared().lock().stop_timer();
    }

    // == Update ==
    /// Replaces the value with `f(current)` and restarts the TTL.
    ///
    /// The read, the call to `f` and the write happen under one lock, so no
    /// concurrent update is lost. `f` must not call back into this cache.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let mut slot = self.inner.shared().lock();
        let next = f(slot.current());
        slot.store(next);
    }

    /// Like [`update`](Self::update), but `f` may refuse.
    ///
    /// On `Err` nothing is stored, the timer keeps running as before and the
    /// error is handed back unchanged.
    pub fn try_update<F, E>(&self, f: F) -> Result<(), E>
    where
        F: FnOnce(T) -> Result<T, E>,
    {
        let mut slot = self.inner.shared().lock();
        let next = f(slot.current())?;
        slot.store(next);
        Ok(())
    }

    // == Inspection ==
    /// TTL that the next write will use.
    pub fn duration(&self) -> Duration {
        self.inner.duration()
    }

    /// Returns true while an eviction task is waiting to clear the value.
    pub fn is_armed(&self) -> bool {
        self.inner.is_armed()
    }

    /// Snapshot of the operation counters.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }
}

impl<T> From<Cache<T>> for SafeCache<T> {
    fn from(inner: Cache<T>) -> Self {
        Self { inner }
    }
}

// == Contract Implementations ==
// Shared handles get the contract too, so a `&SafeCache<T>` or an
// `Arc<SafeCache<T>>` can be passed wherever a `ValueCache<T>` is expected.
macro_rules! impl_value_cache {
    ($($target:ty),+ $(,)?) => {
        $(
            impl<T> ValueCache<T> for $target
            where
                T: Clone + Default + Send + 'static,
            {
                fn set(&mut self, value: T) {
                    SafeCache::set(self, value);
                }

                fn get(&self) -> T {
                    SafeCache::get(self)
                }

                fn set_duration(&mut self, duration: Duration) {
                    SafeCache::set_duration(self, duration);
                }

                fn reset_timer(&mut self) {
                    SafeCache::reset_timer(self);
                }

                fn stop_timer(&mut self) {
                    SafeCache::stop_timer(self);
                }
            }
        )+
    };
}

impl_value_cache!(SafeCache<T>, &SafeCache<T>, Arc<SafeCache<T>>);
