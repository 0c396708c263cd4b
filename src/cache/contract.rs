//! Cache Contract Module
//!
//! The operation set shared by every cache variant, so callers can be
//! written against the trait and handed any of them.

use std::time::Duration;

/// A single value that is cleared after a time-to-live.
///
/// A duration of zero means the value never expires. Clearing replaces the
/// value with the type's empty representation; the cache itself stays usable.
pub trait ValueCache<T> {
    /// Stores `value` and restarts the TTL.
    fn set(&mut self, value: T);

    /// Returns the current value, or the empty value after expiry.
    fn get(&self) -> T;

    /// Changes the TTL used by the next `set` or `reset_timer`.
    ///
    /// A timer that is already running keeps its original deadline.
    fn set_duration(&mut self, duration: Duration);

    /// Restarts the TTL for the value already stored.
    fn reset_timer(&mut self);

    /// Cancels expiry until the next `set` or `reset_timer`.
    fn stop_timer(&mut self);
}
