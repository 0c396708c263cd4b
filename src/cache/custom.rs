//! Custom Cache Module
//!
//! Exposes the cache contract over caller-supplied storage and timers,
//! e.g. an external store that handles expiry itself.

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::cache::ValueCache;
use crate::error::{CacheError, Result};

type SetValueFn<T> = Box<dyn Fn(T, Duration) + Send + Sync>;
type GetValueFn<T> = Box<dyn Fn() -> T + Send + Sync>;
type SetDurationFn = Box<dyn Fn(Duration) -> Duration + Send + Sync>;
type ResetTimerFn = Box<dyn Fn(Duration) + Send + Sync>;
type StopTimerFn = Box<dyn Fn() + Send + Sync>;

// == Custom Cache ==
/// A cache whose every operation is delegated to injected functions.
///
/// The adapter only remembers the duration; storing, reading and timing
/// are entirely up to the backend. Build one with [`CustomCache::builder`].
///
/// # Example
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use ttl_cell::CustomCache;
///
/// let store = Arc::new(Mutex::new(String::new()));
/// let (w, r) = (store.clone(), store.clone());
/// let mut cache = CustomCache::builder(Duration::from_secs(30))
///     .on_set(move |value, _ttl| *w.lock().unwrap() = value)
///     .on_get(move || r.lock().unwrap().clone())
///     .on_set_duration(|ttl| ttl)
///     .on_reset_timer(|_ttl| {})
///     .on_stop_timer(|| {})
///     .build()?;
/// cache.set("hello".to_string());
/// # Ok::<(), ttl_cell::error::CacheError>(())
/// ```
pub struct CustomCache<T> {
    duration: Duration,
    set_value: SetValueFn<T>,
    get_value: GetValueFn<T>,
    set_duration: SetDurationFn,
    reset_timer: ResetTimerFn,
    stop_timer: StopTimerFn,
}

impl<T> CustomCache<T> {
    /// Starts building a custom cache with the initial `duration`.
    pub fn builder(duration: Duration) -> CustomCacheBuilder<T> {
        CustomCacheBuilder::new(duration)
    }

    /// Hands `value` to the backend together with the current duration.
    pub fn set(&mut self, value: T) {
        (self.set_value)(value, self.duration);
    }

    /// Asks the backend for the current value.
    pub fn get(&self) -> T {
        (self.get_value)()
    }

    /// Stores the duration returned by the backend's duration hook,
    /// which may clamp or otherwise adjust `duration`.
    pub fn set_duration(&mut self, duration: Duration) {
        let adjusted = (self.set_duration)(duration);
        if adjusted != duration {
            trace!(requested = ?duration, ?adjusted, "Backend adjusted cache duration");
        }
        self.duration = adjusted;
    }

    /// Asks the backend to restart the TTL with the current duration.
    pub fn reset_timer(&mut self) {
        (self.reset_timer)(self.duration);
    }

    /// Asks the backend to stop expiring the current value.
    pub fn stop_timer(&mut self) {
        (self.stop_timer)();
    }

    /// Duration handed to the next `set` or `reset_timer` hook.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<T> ValueCache<T> for CustomCache<T> {
    fn set(&mut self, value: T) {
        CustomCache::set(self, value);
    }

    fn get(&self) -> T {
        CustomCache::get(self)
    }

    fn set_duration(&mut self, duration: Duration) {
        CustomCache::set_duration(self, duration);
    }

    fn reset_timer(&mut self) {
        CustomCache::reset_timer(self);
    }

    fn stop_timer(&mut self) {
        CustomCache::stop_timer(self);
    }
}

impl<T> fmt::Debug for CustomCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCache")
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

// == Builder ==
/// Collects the five backend operations of a [`CustomCache`].
///
/// Every operation is required; [`build`](Self::build) reports the ones
/// that were never supplied.
pub struct CustomCacheBuilder<T> {
    duration: Duration,
    set_value: Option<SetValueFn<T>>,
    get_value: Option<GetValueFn<T>>,
    set_duration: Option<SetDurationFn>,
    reset_timer: Option<ResetTimerFn>,
    stop_timer: Option<StopTimerFn>,
}

impl<T> CustomCacheBuilder<T> {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            set_value: None,
            get_value: None,
            set_duration: None,
            reset_timer: None,
            stop_timer: None,
        }
    }

    /// Stores a value; receives the cache's current duration.
    pub fn on_set<F>(mut self, f: F) -> Self
    where
        F: Fn(T, Duration) + Send + Sync + 'static,
    {
        self.set_value = Some(Box::new(f));
        self
    }

    /// Reads the current value, returning the empty value after expiry.
    pub fn on_get<F>(mut self, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.get_value = Some(Box::new(f));
        self
    }

    /// Maps a requested duration to the one the cache keeps.
    pub fn on_set_duration<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) -> Duration + Send + Sync + 'static,
    {
        self.set_duration = Some(Box::new(f));
        self
    }

    /// Restarts the backend's timer with the given duration.
    pub fn on_reset_timer<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.reset_timer = Some(Box::new(f));
        self
    }

    /// Stops the backend's timer.
    pub fn on_stop_timer<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.stop_timer = Some(Box::new(f));
        self
    }

    /// Builds the cache, failing if any operation is missing.
    pub fn build(self) -> Result<CustomCache<T>> {
        match self {
            Self {
                duration,
                set_value: Some(set_value),
                get_value: Some(get_value),
                set_duration: Some(set_duration),
                reset_timer: Some(reset_timer),
                stop_timer: Some(stop_timer),
            } => Ok(CustomCache {
                duration,
                set_value,
                get_value,
                set_duration,
                reset_timer,
                stop_timer,
            }),
            incomplete => Err(CacheError::MissingOperations(incomplete.missing())),
        }
    }

    fn missing(&self) -> Vec<&'static str> {
        [
            ("set_value", self.set_value.is_none()),
            ("get_value", self.get_value.is_none()),
            ("set_duration", self.set_duration.is_none()),
            ("reset_timer", self.reset_timer.is_none()),
            ("stop_timer", self.stop_timer.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect()
    }
}

impl<T> fmt::Debug for CustomCacheBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCacheBuilder")
            .field("duration", &self.duration)
            .field("missing", &self.missing())
            .finish()
    }
}
