//! ttl_cell - A single-value in-memory cache with TTL expiration
//!
//! Holds one value that is cleared after a configurable time-to-live, either
//! owned by one caller ([`Cache`]), shared between threads ([`SafeCache`]) or
//! delegated to a custom backend ([`CustomCache`]).

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, CustomCache, SafeCache, ValueCache};
pub use config::Config;
pub use error::CacheError;
pub use tasks::Scheduler;
