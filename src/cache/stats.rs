//! Cache Statistics Module
//!
//! Tracks how a single cached value is written, read and expired.

use serde::Serialize;

// == Cache Stats ==
/// Per-instance usage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of values stored, including updates
    pub sets: u64,
    /// Number of reads
    pub reads: u64,
    /// Number of times an eviction task cleared the value
    pub expirations: u64,
    /// Number of explicit timer resets
    pub timer_resets: u64,
    /// Number of explicit timer stops
    pub timer_stops: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Expiration Rate ==
    /// Fraction of stored values that were cleared by their timer.
    ///
    /// Returns expirations / sets, or 0.0 if nothing was stored yet.
    pub fn expiration_rate(&self) -> f64 {
        if self.sets == 0 {
            0.0
        } else {
            self.expirations as f64 / self.sets as f64
        }
    }

    // == Recording ==
    /// Counts a stored value, from `set` or an update.
    pub(crate) fn record_set(&mut self) {
        self.sets += 1;
    }

    /// Counts a read through `get`.
    pub(crate) fn record_read(&mut self) {
        self.reads += 1;
    }

    /// Counts a value cleared by its eviction task.
    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Counts an explicit `reset_timer` call.
    pub(crate) fn record_timer_reset(&mut self) {
        self.timer_resets += 1;
    }

    /// Counts an explicit `stop_timer` call.
    pub(crate) fn record_timer_stop(&mut self) {
        self.timer_stops += 1;
    }
}
