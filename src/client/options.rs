//! Fetch Options Module
//!
//! Per-call configuration for the resilient fetch wrapper.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::cache::CachePriority;
use crate::config::Config;

// == Fetch Options ==
/// Configuration for one logical fetch call.
///
/// Constructed per call and consumed by [`crate::client::FetchClient::fetch`];
/// the builder-style `with_*` methods cover the common adjustments.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// HTTP method
    pub method: Method,
    /// Additional request headers
    pub headers: HeaderMap,
    /// JSON request body, if any
    pub body: Option<Value>,
    /// Per-attempt timeout; the attempt is abandoned when it elapses
    pub timeout: Duration,
    /// Number of retries after the initial attempt
    pub retries: u32,
    /// Delay before the first retry, doubled for each subsequent one
    pub retry_delay: Duration,
    /// Whether to consult and populate the cache
    pub cache: bool,
    /// Cache key; required for caching to take effect
    pub cache_key: Option<String>,
    /// TTL for the cached response; `None` uses the store default,
    /// `Duration::ZERO` caches without expiry
    pub cache_ttl: Option<Duration>,
    /// Priority recorded on the cached entry
    pub cache_priority: CachePriority,
    /// Value returned as a successful result when all attempts fail
    pub fallback: Option<Value>,
    /// Whether exhausted failures are reported to the error notifier
    pub notify_on_error: bool,
    /// Caller-supplied cancellation, composed with the per-attempt timeout
    pub cancel: Option<CancellationToken>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            timeout: Duration::from_millis(15_000),
            retries: 2,
            retry_delay: Duration::from_millis(1_000),
            cache: false,
            cache_key: None,
            cache_ttl: None,
            cache_priority: CachePriority::Normal,
            fallback: None,
            notify_on_error: true,
            cancel: None,
        }
    }
}

impl FetchOptions {
    // == Constructors ==
    /// Creates options seeded from the fetch-layer configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.timeout,
            retries: config.retries,
            retry_delay: config.retry_delay,
            ..Self::default()
        }
    }

    // == Builders ==
    /// Sets the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the JSON request body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry count.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the base retry delay.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Enables caching under the given key.
    pub fn cached(mut self, key: impl Into<String>) -> Self {
        self.cache = true;
        self.cache_key = Some(key.into());
        self
    }

    /// Sets the TTL for the cached response.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Sets the priority recorded on the cached entry.
    pub fn with_cache_priority(mut self, priority: CachePriority) -> Self {
        self.cache_priority = priority;
        self
    }

    /// Sets a fallback value returned when all attempts fail.
    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Suppresses the error notifier for this call.
    pub fn silent(mut self) -> Self {
        self.notify_on_error = false;
        self
    }

    /// Attaches a caller-supplied cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}
