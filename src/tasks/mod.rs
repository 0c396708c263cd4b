//! Background Tasks Module
//!
//! Contains the tasks that run independently of caller operations.
//!
//! # Tasks
//! - Eviction: clears a cached value once its TTL has elapsed

mod eviction;

pub use eviction::Scheduler;
