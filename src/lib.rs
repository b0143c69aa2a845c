//! Refetch - a resilient HTTP fetch layer
//!
//! Provides an in-memory TTL cache and a fetch wrapper with timeout racing,
//! retry backoff and read-through caching.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod tasks;

pub use cache::{CachePriority, CacheStats, CacheStore, Memoizer, SharedCache};
pub use client::{ApiClient, ApiDefaults, FetchClient, FetchOptions, FetchResult};
pub use config::Config;
pub use error::FetchError;
pub use notify::{ErrorNotifier, FailureKind, TracingNotifier};
pub use tasks::spawn_sweep_task;
