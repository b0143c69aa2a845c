//! Configuration Module
//!
//! Handles loading and managing fetch-layer configuration from environment
//! variables.

use std::env;
use std::time::Duration;

/// Fetch-layer configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-attempt timeout for network calls
    pub timeout: Duration,
    /// Number of retries after the initial attempt
    pub retries: u32,
    /// Delay before the first retry, doubled for each subsequent one
    pub retry_delay: Duration,
    /// TTL applied to cached responses without an explicit duration
    pub default_ttl: Duration,
    /// Interval between background sweeps of expired entries
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FETCH_TIMEOUT_MS` - Per-attempt timeout in milliseconds (default: 15000)
    /// - `FETCH_RETRIES` - Retry count after the initial attempt (default: 2)
    /// - `FETCH_RETRY_DELAY_MS` - Base retry delay in milliseconds (default: 1000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default cache TTL in milliseconds (default: 300000)
    /// - `SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 300)
    pub fn from_env() -> Self {
        Self {
            timeout: Duration::from_millis(env_parse("FETCH_TIMEOUT_MS", 15_000)),
            retries: env_parse("FETCH_RETRIES", 2u32),
            retry_delay: Duration::from_millis(env_parse("FETCH_RETRY_DELAY_MS", 1_000)),
            default_ttl: Duration::from_millis(env_parse("CACHE_DEFAULT_TTL_MS", 300_000)),
            sweep_interval: Duration::from_secs(env_parse("SWEEP_INTERVAL_SECS", 300)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(15_000),
            retries: 2,
            retry_delay: Duration::from_millis(1_000),
            default_ttl: Duration::from_millis(300_000),
            sweep_interval: Duration::from_secs(300),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
