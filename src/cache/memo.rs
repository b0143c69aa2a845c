//! Memoization Module
//!
//! Read-through memoization over the shared cache store.
//!
//! Keys are always explicit: a `Memoizer` carries a namespace and each call
//! supplies its own key. Deriving keys from function names or argument
//! serialization is deliberately unsupported, callers own key stability.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::{CachePriority, SharedCache};

// == Memoizer ==
/// Caches the results of expensive computations under explicit keys.
///
/// On a miss the computation runs and its *resolved* result is stored; the
/// cache is never populated with a pending placeholder, so a computation
/// that is awaited twice concurrently will run twice (last writer wins).
#[derive(Debug, Clone)]
pub struct Memoizer {
    cache: SharedCache,
    namespace: String,
    ttl: Option<Duration>,
    priority: CachePriority,
}

impl Memoizer {
    // == Constructor ==
    /// Creates a new Memoizer over the given cache.
    ///
    /// # Arguments
    /// * `cache` - The shared store backing this memoizer
    /// * `namespace` - Prefix applied to every key to keep callers disjoint
    pub fn new(cache: SharedCache, namespace: impl Into<String>) -> Self {
        Self {
            cache,
            namespace: namespace.into(),
            ttl: None,
            priority: CachePriority::Normal,
        }
    }

    /// Sets the TTL applied to memoized results.
    ///
    /// `None` (the default) uses the store's default TTL;
    /// `Duration::ZERO` stores results that never expire.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the priority recorded on memoized entries.
    pub fn with_priority(mut self, priority: CachePriority) -> Self {
        self.priority = priority;
        self
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    // == Get Or Compute ==
    /// Returns the cached result for `key`, computing and storing it on a miss.
    ///
    /// A cached value that no longer deserializes into `T` is treated as a
    /// miss and recomputed, overwriting the stale shape. A result that cannot
    /// be serialized is returned to the caller without being cached.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let full_key = self.full_key(key);

        if let Some(cached) = self.cache.get(&full_key).await {
            match serde_json::from_value(cached) {
                Ok(value) => return value,
                Err(err) => {
                    debug!(key = %full_key, %err, "cached value no longer deserializes, recomputing");
                }
            }
        }

        let result = compute().await;
        self.store_result(&full_key, &result).await;
        result
    }

    /// Synchronous variant of [`get_or_compute`](Self::get_or_compute).
    pub async fn get_or_compute_sync<T, F>(&self, key: &str, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let full_key = self.full_key(key);

        if let Some(cached) = self.cache.get(&full_key).await {
            if let Ok(value) = serde_json::from_value(cached) {
                return value;
            }
        }

        let result = compute();
        self.store_result(&full_key, &result).await;
        result
    }

    async fn store_result<T: Serialize>(&self, full_key: &str, result: &T) {
        match serde_json::to_value(result) {
            Ok(value) => {
                self.cache
                    .set_with_priority(full_key, value, self.ttl, self.priority)
                    .await;
            }
            Err(err) => {
                debug!(key = %full_key, %err, "result not serializable, skipping cache");
            }
        }
    }
}
