//! Cache Slot Module
//!
//! The value, its TTL and the pending eviction task live behind one mutex.
//! Caller operations and the eviction task both take that mutex, so an
//! expiry can never interleave with a write.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::cache::CacheStats;
use crate::tasks::Scheduler;

// == Slot ==
struct Slot<T> {
    /// The cached value, `T::default()` when empty or expired
    value: T,
    /// TTL used when the timer is next armed, zero never expires
    duration: Duration,
    /// Eviction task for the current value, if armed
    pending: Option<JoinHandle<()>>,
    /// Bumped on every cancel so a task that already woke up can tell it was superseded
    generation: u64,
    stats: CacheStats,
}

impl<T: Default> Slot<T> {
    /// Clears the value if `generation` still names the armed timer.
    fn expire(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.pending.is_none() {
            return false;
        }
        self.value = T::default();
        self.pending = None;
        self.stats.record_expiration();
        true
    }
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

// == Shared ==
/// Lock-guarded cache state plus the scheduler its timers run on.
pub(crate) struct Shared<T> {
    slot: Arc<Mutex<Slot<T>>>,
    scheduler: Scheduler,
}

impl<T> Shared<T> {
    pub(crate) fn new(scheduler: Scheduler, duration: Duration) -> Self
    where
        T: Default,
    {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value: T::default(),
                duration,
                pending: None,
                generation: 0,
                stats: CacheStats::new(),
            })),
            scheduler,
        }
    }

    /// Takes the exclusive lock for one cache operation.
    pub(crate) fn lock(&self) -> SlotGuard<'_, T> {
        SlotGuard {
            slot: self.slot.lock(),
            shared: self,
        }
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("Shared")
            .field("duration", &slot.duration)
            .field("armed", &slot.pending.is_some())
            .field("stats", &slot.stats)
            .finish()
    }
}

// == Slot Guard ==
/// Exclusive access to the cache state for the lifetime of the guard.
pub(crate) struct SlotGuard<'a, T> {
    slot: MutexGuard<'a, Slot<T>>,
    shared: &'a Shared<T>,
}

impl<T> SlotGuard<'_, T>
where
    T: Clone + Default + Send + 'static,
{
    /// Returns a copy of the current value and counts the read.
    pub(crate) fn value(&mut self) -> T {
        self.slot.stats.record_read();
        self.slot.value.clone()
    }

    /// Current value without counting a read, for read-modify-write.
    pub(crate) fn current(&self) -> T {
        self.slot.value.clone()
    }

    /// Stores `value` and re-arms the timer with the current duration.
    pub(crate) fn store(&mut self, value: T) {
        self.slot.value = value;
        self.slot.stats.record_set();
        self.arm();
    }

    pub(crate) fn set_duration(&mut self, duration: Duration) {
        self.slot.duration = duration;
    }

    pub(crate) fn duration(&self) -> Duration {
        self.slot.duration
    }

    /// Restarts the TTL for the value already stored.
    pub(crate) fn reset_timer(&mut self) {
        self.slot.stats.record_timer_reset();
        self.arm();
    }

    /// Cancels the pending eviction, keeping the value indefinitely.
    pub(crate) fn stop_timer(&mut self) {
        self.slot.stats.record_timer_stop();
        self.cancel();
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.slot
            .pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.slot.stats.clone()
    }

    // == Timer State Machine ==
    fn arm(&mut self) {
        self.cancel();

        let duration = self.slot.duration;
        if duration.is_zero() {
            return;
        }

        let generation = self.slot.generation;
        let slot = Arc::downgrade(&self.shared.slot);
        let handle = self.shared.scheduler.spawn_eviction(duration, move || {
            // The cache may already be gone
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let expired = slot.lock().expire(generation);
            if expired {
                debug!(?duration, "Cached value expired");
            }
        });

        self.slot.pending = Some(handle);
        trace!(?duration, generation, "Eviction timer armed");
    }

    fn cancel(&mut self) {
        self.slot.generation = self.slot.generation.wrapping_add(1);
        if let Some(handle) = self.slot.pending.take() {
            handle.abort();
            trace!("Eviction timer cancelled");
        }
    }
}
