//! Client Module
//!
//! The resilient fetch wrapper and the base-URL-bound API client built on it.

mod api;
mod fetch;
mod options;
mod result;

// Re-export public types
pub use api::{ApiClient, ApiDefaults};
pub use fetch::FetchClient;
pub use options::FetchOptions;
pub use result::FetchResult;
