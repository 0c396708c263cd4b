//! Cache Module
//!
//! Provides a single-value cache with TTL expiration. Every variant
//! implements [`ValueCache`], so callers can swap one for another.

mod cell;
mod contract;
mod custom;
mod safe;
mod slot;
mod stats;


// Re-export public types
pub use cell::Cache;
pub use contract::ValueCache;
pub use custom::{CustomCache, CustomCacheBuilder};
pub use safe::SafeCache;
pub use stats::CacheStats;
