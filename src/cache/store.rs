//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration.
//!
//! The store is constructed explicitly and shared via [`SharedCache`]; there
//! is no module-level singleton, and the sweep task's lifecycle belongs to
//! whoever spawned it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CachePriority, CacheStats, DEFAULT_TTL};

// == Cache Store ==
/// In-memory key/value store with per-entry TTL.
///
/// Expiry is enforced two ways: lazily on `get` (an expired entry read
/// behaves as a miss and is deleted before returning) and eagerly by
/// `sweep_expired`, normally driven by the background sweep task. None of
/// the operations can fail; validation of stored values is the caller's
/// responsibility.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL applied when `set` is called without an explicit duration
    default_ttl: Duration,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given default TTL.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied to entries stored without an explicit one
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` on a miss or on an expired entry. Expired entries are
    /// deleted as a side effect of being read, so a read of an expired entry
    /// is indistinguishable from a miss afterwards.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.stats.record_miss();
                None
            }
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Checks whether a fresh (unexpired) entry exists for the key.
    ///
    /// Does not mutate the store and does not count as a hit or miss.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is overwritten and TTL is reset.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - `None` uses the default TTL; `Some(Duration::ZERO)` means
    ///   the entry never expires; any other duration sets expiry to now + ttl
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        self.set_with_priority(key, value, ttl, CachePriority::Normal);
    }

    /// Stores a key-value pair with optional TTL and an explicit priority.
    pub fn set_with_priority(
        &mut self,
        key: impl Into<String>,
        value: Value,
        ttl: Option<Duration>,
        priority: CachePriority,
    ) {
        let effective_ttl = match ttl {
            None => Some(self.default_ttl),
            Some(Duration::ZERO) => None,
            Some(d) => Some(d),
        };

        let entry = CacheEntry::with_priority(value, effective_ttl, priority);
        self.entries.insert(key.into(), entry);
    }

    // == Remove ==
    /// Removes an entry by key.
    ///
    /// # Arguments
    /// * `key` - The key to delete
    ///
    /// # Returns
    /// Whether an entry was actually deleted.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes all entries unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Sweep Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
        }

        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    ///
    /// A point-in-time count that does not mutate the store: expired entries
    /// that have not yet been removed are reported in `expired_items`, not
    /// deleted (contrast with `get`, which deletes what it reads expired).
    pub fn stats(&self) -> CacheStats {
        let total = self.entries.len();
        let expired = self
            .entries
            .values()
            .filter(|entry| entry.is_expired())
            .count();

        let mut stats = self.stats.clone();
        stats.set_item_counts(total, total - expired, expired);
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Shared Cache ==
/// Thread-safe handle to a [`CacheStore`] shared across tasks.
///
/// Cloning is cheap; all clones point at the same store. The async methods
/// mirror the store's operations, holding the lock only for the duration of
/// one synchronous cache operation.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<RwLock<CacheStore>>,
}

impl Default for SharedCache {
    fn default() -> Self {
        Self::new(CacheStore::default())
    }
}

impl SharedCache {
    /// Creates a new SharedCache wrapping the given store.
    pub fn new(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Retrieves a value by key. See [`CacheStore::get`].
    pub async fn get(&self, key: &str) -> Option<Value> {
        // Write lock: a get may delete an expired entry and bumps counters
        self.inner.write().await.get(key)
    }

    /// Checks whether a fresh entry exists for the key.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.contains(key)
    }

    /// Stores a key-value pair. See [`CacheStore::set`].
    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        self.inner.write().await.set(key, value, ttl);
    }

    /// Stores a key-value pair with an explicit priority.
    pub async fn set_with_priority(
        &self,
        key: impl Into<String>,
        value: Value,
        ttl: Option<Duration>,
        priority: CachePriority,
    ) {
        self.inner
            .write()
            .await
            .set_with_priority(key, value, ttl, priority);
    }

    /// Removes an entry, returning whether one was deleted.
    pub async fn remove(&self, key: &str) -> bool {
        self.inner.write().await.remove(key)
    }

    /// Removes all entries.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Removes all expired entries, returning the count removed.
    pub async fn sweep_expired(&self) -> usize {
        self.inner.write().await.sweep_expired()
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns true if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
