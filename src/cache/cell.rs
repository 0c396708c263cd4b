//! Core Cache Module
//!
//! Single-owner cache holding one value and its eviction timer.

use std::time::Duration;

use crate::cache::slot::Shared;
use crate::cache::{CacheStats, ValueCache};
use crate::config::Config;
use crate::tasks::Scheduler;

// == Cache ==
/// A single value with a time-to-live.
///
/// Mutating operations take `&mut self`, so the cache has exactly one owner.
/// Use [`SafeCache`](crate::cache::SafeCache) to share one between threads.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use ttl_cell::Cache;
///
/// let mut cache = Cache::new(Duration::from_secs(5));
/// cache.set("token".to_string());
/// assert_eq!(cache.get(), "token");
/// ```
#[derive(Debug)]
pub struct Cache<T> {
    shared: Shared<T>,
}

impl<T> Cache<T>
where
    T: Clone + Default + Send + 'static,
{
    // == Constructors ==
    /// Creates an empty cache whose values live for `duration`.
    ///
    /// A zero duration means values never expire. Timers run on the caller's
    /// multi-threaded tokio runtime, otherwise on a shared background runtime.
    ///
    /// # Panics
    /// Panics if the background runtime is needed and cannot be started.
    pub fn new(duration: Duration) -> Self {
        Self::new_in(Scheduler::current(), duration)
    }

    /// Creates a cache holding `value`, with its timer already running.
    pub fn with_value(duration: Duration, value: T) -> Self {
        let mut cache = Self::new(duration);
        cache.set(value);
        cache
    }

    /// Creates an empty cache whose timers run on `scheduler`.
    pub fn new_in(scheduler: Scheduler, duration: Duration) -> Self {
        Self {
            shared: Shared::new(scheduler, duration),
        }
    }

    /// Creates an empty cache using the configured default TTL.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_ttl)
    }

    // == Contract ==
    /// Stores `value`, replacing any pending eviction with a fresh one.
    pub fn set(&mut self, value: T) {
        self.shared.lock().store(value);
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.shared.lock().value()
    }

    /// Sets the TTL for the next `set` or `reset_timer` call.
    pub fn set_duration(&mut self, duration: Duration) {
        self.shared.lock().set_duration(duration);
    }

    /// Restarts the TTL without touching the value.
    ///
    /// With a zero duration the pending timer is cancelled and nothing is armed.
    pub fn reset_timer(&mut self) {
        self.shared.lock().reset_timer();
    }

    /// Cancels the pending eviction, if any.
    pub fn stop_timer(&mut self) {
        self.shared.lock().stop_timer();
    }

    // == Inspection ==
    /// TTL that the next `set` or `reset_timer` will use.
    pub fn duration(&self) -> Duration {
        self.shared.lock().duration()
    }

    /// Returns true while an eviction task is waiting to clear the value.
    pub fn is_armed(&self) -> bool {
        self.shared.lock().is_armed()
    }

    /// Snapshot of the operation counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.lock().stats()
    }

    pub(crate) fn shared(&self) -> &Shared<T> {
        &self.shared
    }
}

impl<T> ValueCache<T> for Cache<T>
where
    T: Clone + Default + Send + 'static,
{
    fn set(&mut self, value: T) {
        Cache::set(self, value);
    }

    fn get(&self) -> T {
        Cache::get(self)
    }

    fn set_duration(&mut self, duration: Duration) {
        Cache::set_duration(self, duration);
    }

    fn reset_timer(&mut self) {
        Cache::reset_timer(self);
    }

    fn stop_timer(&mut self) {
        Cache::stop_timer(self);
    }
}
