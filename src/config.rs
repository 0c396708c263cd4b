//! Configuration Module
//!
//! Handles loading cache settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

const DEFAULT_TTL_MS: u64 = 300_000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL applied to caches built from this config, zero means never expire
    pub default_ttl: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Missing or malformed values fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - TTL in milliseconds, 0 disables expiry (default: 300000)
    pub fn from_env() -> Self {
        Self {
            default_ttl: Duration::from_millis(
                read_var("CACHE_TTL_MS").ok().flatten().unwrap_or(DEFAULT_TTL_MS),
            ),
        }
    }

    /// Like [`Config::from_env`], but a variable that is set and cannot be
    /// parsed is reported instead of silently replaced by its default.
    pub fn try_from_env() -> Result<Self> {
        Ok(Self {
            default_ttl: Duration::from_millis(
                read_var("CACHE_TTL_MS")?.unwrap_or(DEFAULT_TTL_MS),
            ),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_millis(DEFAULT_TTL_MS),
        }
    }
}

/// Reads and parses one variable; `Ok(None)` when it is unset.
fn read_var<V: FromStr>(name: &str) -> Result<Option<V>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::InvalidConfig(format!("{}={}", name, raw))),
        Err(_) => Ok(None),
    }
}
