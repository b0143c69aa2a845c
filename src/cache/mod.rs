//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and read-through
//! memoization.

mod entry;
mod memo;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CachePriority};
pub use memo::Memoizer;
pub use stats::CacheStats;
pub use store::{CacheStore, SharedCache};

use std::time::Duration;

// == Public Constants ==
/// TTL applied when none is given
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Longer TTL for call sites caching slow-changing data
pub const LONG_TTL: Duration = Duration::from_secs(60 * 60);

/// Interval between background sweeps of expired entries
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
