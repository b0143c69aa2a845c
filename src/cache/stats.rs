//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and entry counts.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time cache statistics.
///
/// The item counts (`total_items`, `active_items`, `expired_items`) are a
/// snapshot taken without mutating the store; expired entries that have not
/// yet been removed by a read or a sweep are counted as expired, not deleted.
/// The hit/miss counters are cumulative for the store's lifetime.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of entries currently held, expired or not
    pub total_items: usize,
    /// Number of entries that have not expired
    pub active_items: usize,
    /// Number of entries past their expiry but not yet removed
    pub expired_items: usize,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Update Item Counts ==
    /// Updates the snapshot item counts.
    pub fn set_item_counts(&mut self, total: usize, active: usize, expired: usize) {
        self.total_items = total;
        self.active_items = active;
        self.expired_items = expired;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.active_items, 0);
        assert_eq!(stats.expired_items, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_set_item_counts() {
        let mut stats = CacheStats::new();
        stats.set_item_counts(42, 40, 2);
        assert_eq!(stats.total_items, 42);
        assert_eq!(stats.active_items, 40);
        assert_eq!(stats.expired_items, 2);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"hits\":1"));
        assert!(json.contains("total_items"));
    }
}
