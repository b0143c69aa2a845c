//! API Client Module
//!
//! A thin binder over [`FetchClient`] fixing a base URL and default options.
//! Reads default to cache-enabled, mutating verbs to cache-disabled.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use crate::cache::CachePriority;
use crate::client::{FetchClient, FetchOptions, FetchResult};

// == Api Defaults ==
/// Per-client defaults applied to every call made through an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiDefaults {
    /// Per-attempt timeout for calls through this client
    pub timeout: Duration,
    /// TTL for cached reads; `None` uses the store default
    pub cache_ttl: Option<Duration>,
    /// Priority recorded on cached reads
    pub cache_priority: CachePriority,
}

impl Default for ApiDefaults {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            cache_ttl: None,
            cache_priority: CachePriority::Normal,
        }
    }
}

// == Api Client ==
/// Base-URL-bound client with cache defaults pre-filled.
///
/// Cache keys default to `"{METHOD}:{url}"`, so `invalidate` and `is_cached`
/// address exactly what `get` stored.
#[derive(Clone)]
pub struct ApiClient {
    client: FetchClient,
    base_url: String,
    defaults: ApiDefaults,
}

impl ApiClient {
    // == Constructors ==
    /// Creates a new ApiClient bound to a base URL.
    ///
    /// # Arguments
    /// * `base_url` - Prefix for every path passed to this client
    /// * `client` - The fetch client performing the actual calls
    pub fn new(base_url: impl Into<String>, client: FetchClient) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client,
            base_url,
            defaults: ApiDefaults::default(),
        }
    }

    /// Replaces the per-client defaults.
    pub fn with_defaults(mut self, defaults: ApiDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    // == Key And Url Construction ==
    /// Absolute URL for a path.
    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Default cache key for a method/path pair.
    fn cache_key(&self, method: &Method, path: &str) -> String {
        format!("{}:{}", method, self.url(path))
    }

    fn base_options(&self) -> FetchOptions {
        self.client.options().with_timeout(self.defaults.timeout)
    }

    // == Reads ==
    /// GET a path, cache-enabled under the default key.
    pub async fn get(&self, path: &str) -> FetchResult {
        self.get_with(path, self.base_options()).await
    }

    /// GET a path with adjusted options.
    ///
    /// Caching stays enabled; a missing cache key is filled with the default
    /// `"{METHOD}:{url}"` key.
    pub async fn get_with(&self, path: &str, options: FetchOptions) -> FetchResult {
        let mut options = options.with_method(Method::GET);
        options.cache = true;
        if options.cache_key.is_none() {
            options.cache_key = Some(self.cache_key(&Method::GET, path));
        }
        if options.cache_ttl.is_none() {
            options.cache_ttl = self.defaults.cache_ttl;
        }
        options.cache_priority = self.defaults.cache_priority;

        self.client.fetch(&self.url(path), options).await
    }

    /// Warms the cache for a path, discarding the payload.
    ///
    /// Failures are not reported to the notifier; preloading is advisory.
    pub async fn preload(&self, path: &str) -> bool {
        self.get_with(path, self.base_options().silent())
            .await
            .is_success()
    }

    // == Writes ==
    /// POST a JSON body, cache-disabled.
    pub async fn post(&self, path: &str, body: Value) -> FetchResult {
        self.client
            .fetch(
                &self.url(path),
                self.base_options()
                    .with_method(Method::POST)
                    .with_body(body),
            )
            .await
    }

    /// PUT a JSON body, cache-disabled.
    pub async fn put(&self, path: &str, body: Value) -> FetchResult {
        self.client
            .fetch(
                &self.url(path),
                self.base_options().with_method(Method::PUT).with_body(body),
            )
            .await
    }

    /// DELETE a path, cache-disabled.
    pub async fn delete(&self, path: &str) -> FetchResult {
        self.client
            .fetch(&self.url(path), self.base_options().with_method(Method::DELETE))
            .await
    }

    // == Cache Management ==
    /// Removes the cached read for a path.
    ///
    /// # Returns
    /// Whether an entry was actually removed.
    pub async fn invalidate(&self, path: &str) -> bool {
        let key = self.cache_key(&Method::GET, path);
        self.client.cache().remove(&key).await
    }

    /// Whether a fresh cached read exists for a path.
    pub async fn is_cached(&self, path: &str) -> bool {
        let key = self.cache_key(&Method::GET, path);
        self.client.cache().contains(&key).await
    }
}
