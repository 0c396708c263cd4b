//! Integration Tests for the Cache Contract
//!
//! Drives every cache variant through `ValueCache` with the same scenarios.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::{sleep, Instant};
use ttl_cell::{Cache, CacheError, CustomCache, SafeCache, Scheduler, ValueCache};

// == Helper Functions ==

/// Schedules timers on the test's runtime, so the paused clock drives them.
fn local() -> Scheduler {
    Scheduler::from_handle(Handle::current())
}

/// Value and deadline behind the custom backend, on the tokio clock.
#[derive(Default)]
struct Deadline {
    value: String,
    expires_at: Option<Instant>,
}

impl Deadline {
    fn expire(&mut self) {
        if self.expires_at.is_some_and(|at| Instant::now() >= at) {
            *self = Deadline::default();
        }
    }
}

/// A custom backend that expires lazily, whenever it is touched.
fn deadline_cache(ttl: Duration) -> CustomCache<String> {
    let state: Arc<Mutex<Deadline>> = Arc::default();
    let (set, get, reset, stop) = (state.clone(), state.clone(), state.clone(), state);
    let deadline = |ttl: Duration| (!ttl.is_zero()).then(|| Instant::now() + ttl);

    CustomCache::builder(ttl)
        .on_set(move |value, ttl| {
            *set.lock() = Deadline {
                value,
                expires_at: deadline(ttl),
            }
        })
        .on_get(move || {
            let mut state = get.lock();
            state.expire();
            state.value.clone()
        })
        .on_set_duration(|ttl| ttl)
        .on_reset_timer(move |ttl| {
            let mut state = reset.lock();
            state.expire();
            state.expires_at = deadline(ttl);
        })
        .on_stop_timer(move || {
            let mut state = stop.lock();
            state.expire();
            state.expires_at = None;
        })
        .build()
        .unwrap()
}

async fn expires_after_ttl<C: ValueCache<String>>(mut cache: C) {
    cache.set("value".to_string());
    assert_eq!(cache.get(), "value");

    sleep(Duration::from_millis(30)).await;
    assert_eq!(cache.get(), "value");

    sleep(Duration::from_millis(40)).await;
    assert_eq!(cache.get(), "");
}

async fn reset_extends_ttl<C: ValueCache<String>>(mut cache: C) {
    cache.set("a".to_string());

    sleep(Duration::from_millis(80)).await;
    cache.reset_timer();

    sleep(Duration::from_millis(70)).await;
    assert_eq!(cache.get(), "a");

    sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get(), "");
}

async fn stop_suspends_expiry<C: ValueCache<String>>(mut cache: C) {
    cache.set("kept".to_string());
    cache.stop_timer();

    sleep(Duration::from_secs(10)).await;
    assert_eq!(cache.get(), "kept");

    cache.reset_timer();
    sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get(), "");
}

async fn reset_after_expiry_keeps_default<C: ValueCache<String>>(mut cache: C) {
    cache.set("old".to_string());
    sleep(Duration::from_millis(60)).await;

    // An expired value must not come back when the timer restarts
    cache.reset_timer();
    assert_eq!(cache.get(), "");

    cache.stop_timer();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(cache.get(), "");
}

async fn zero_duration_is_permanent<C: ValueCache<String>>(mut cache: C) {
    cache.set_duration(Duration::ZERO);
    for value in ["one", "two", "three"] {
        cache.set(value.to_string());
        sleep(Duration::from_secs(60)).await;
        assert_eq!(cache.get(), value);
    }
}

// == Scenarios ==

#[tokio::test(start_paused = true)]
async fn test_expiry_all_variants() {
    let ttl = Duration::from_millis(50);
    expires_after_ttl(Cache::new_in(local(), ttl)).await;
    expires_after_ttl(SafeCache::new_in(local(), ttl)).await;
    expires_after_ttl(Arc::new(SafeCache::new_in(local(), ttl))).await;
    expires_after_ttl(deadline_cache(ttl)).await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_timer_all_variants() {
    let ttl = Duration::from_millis(100);
    reset_extends_ttl(Cache::new_in(local(), ttl)).await;
    reset_extends_ttl(SafeCache::new_in(local(), ttl)).await;
    reset_extends_ttl(deadline_cache(ttl)).await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_timer_all_variants() {
    let ttl = Duration::from_millis(50);
    stop_suspends_expiry(Cache::new_in(local(), ttl)).await;
    stop_suspends_expiry(SafeCache::new_in(local(), ttl)).await;
    stop_suspends_expiry(deadline_cache(ttl)).await;
}

#[tokio::test(start_paused = true)]
async fn test_reset_after_expiry_all_variants() {
    let ttl = Duration::from_millis(50);
    reset_after_expiry_keeps_default(Cache::new_in(local(), ttl)).await;
    reset_after_expiry_keeps_default(SafeCache::new_in(local(), ttl)).await;
    reset_after_expiry_keeps_default(deadline_cache(ttl)).await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_duration_all_variants() {
    let ttl = Duration::from_millis(50);
    zero_duration_is_permanent(Cache::new_in(local(), ttl)).await;
    zero_duration_is_permanent(SafeCache::new_in(local(), ttl)).await;
    zero_duration_is_permanent(deadline_cache(ttl)).await;
}

#[tokio::test(start_paused = true)]
async fn test_integer_scenario() {
    let mut cache = Cache::new_in(local(), Duration::from_millis(50));
    cache.set(100);

    sleep(Duration::from_millis(30)).await;
    assert_eq!(cache.get(), 100);

    sleep(Duration::from_millis(40)).await;
    assert_eq!(cache.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_borrowed_safe_cache_through_contract() {
    let cache = SafeCache::new_in(local(), Duration::from_millis(50));
    expires_after_ttl(&cache).await;

    // The owner still sees the cleared value
    assert_eq!(cache.get(), "");
    assert_eq!(cache.stats().expirations, 1);
}

#[test]
fn test_custom_cache_missing_set_duration() {
    let result = CustomCache::<String>::builder(Duration::from_secs(1))
        .on_set(|_, _| {})
        .on_get(String::new)
        .on_reset_timer(|_| {})
        .on_stop_timer(|| {})
        .build();

    match result {
        Err(CacheError::MissingOperations(missing)) => assert_eq!(missing, ["set_duration"]),
        other => panic!("expected a missing operation error, got {:?}", other),
    }
}
