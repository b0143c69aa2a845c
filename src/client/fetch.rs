//! Resilient Fetch Module
//!
//! One logical HTTP request with bounded wait time, bounded retry attempts
//! and optional read-through caching. Every outcome is encoded in the
//! returned [`FetchResult`]; no failure mode escapes as a panic or an `Err`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::SharedCache;
use crate::client::{FetchOptions, FetchResult};
use crate::config::Config;
use crate::error::FetchError;
use crate::notify::{ErrorNotifier, TracingNotifier};

// == Fetch Client ==
/// HTTP front-end adding timeout racing, retry with exponential backoff and
/// transparent caching over a [`reqwest::Client`].
///
/// A call moves through cache check, then sequential attempts, each raced
/// against its timeout and the caller's cancellation token. Only timeout and
/// offline failures are retried; the backoff before retry `n` is
/// `retry_delay * 2^(n-1)`. Concurrent calls that miss on the same cache key
/// each perform their own network call and the last writer wins, there is no
/// single-flight deduplication.
#[derive(Clone)]
pub struct FetchClient {
    http: reqwest::Client,
    cache: SharedCache,
    config: Config,
    notifier: Arc<dyn ErrorNotifier>,
}

impl FetchClient {
    // == Constructors ==
    /// Creates a new FetchClient over the given cache with default
    /// configuration.
    pub fn new(cache: SharedCache) -> Self {
        Self::with_config(cache, Config::default())
    }

    /// Creates a new FetchClient with explicit configuration.
    pub fn with_config(cache: SharedCache, config: Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            cache,
            config,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Replaces the underlying HTTP client.
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Replaces the failure notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn ErrorNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // == Accessors ==
    /// The cache backing this client.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// New options seeded from this client's configuration.
    pub fn options(&self) -> FetchOptions {
        FetchOptions::from_config(&self.config)
    }

    // == Fetch ==
    /// Performs one logical request.
    ///
    /// With caching enabled and a fresh entry under the key, the network is
    /// skipped entirely and the cached value is returned. Otherwise attempts
    /// run strictly in sequence: each races the request against the timeout
    /// and the caller's cancellation token, retryable failures back off
    /// exponentially, and a terminal failure either surfaces in the result
    /// or is masked by the configured fallback value.
    pub async fn fetch(&self, url: &str, options: FetchOptions) -> FetchResult {
        // Cache check
        if options.cache {
            if let Some(key) = options.cache_key.as_deref() {
                if let Some(value) = self.cache.get(key).await {
                    debug!(%url, key, "cache hit, skipping network");
                    return FetchResult::from_cache(value);
                }
            }
        }

        let mut attempt: u32 = 0;
        let error = loop {
            match self.attempt(url, &options).await {
                Ok(result) => {
                    if options.cache {
                        if let Some(key) = &options.cache_key {
                            if let Some(data) = &result.data {
                                self.cache
                                    .set_with_priority(
                                        key.clone(),
                                        data.clone(),
                                        options.cache_ttl,
                                        options.cache_priority,
                                    )
                                    .await;
                            }
                        }
                    }
                    return result;
                }
                Err(err) if err.is_retryable() && attempt < options.retries => {
                    let delay = options.retry_delay * 2u32.saturating_pow(attempt);
                    debug!(%url, attempt = attempt + 1, ?delay, %err, "retrying after backoff");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    break FetchError::Exhausted {
                        attempts: attempt + 1,
                        last: Box::new(err),
                    };
                }
                Err(err) => break err,
            }
        };

        self.finish_failure(url, &options, error)
    }

    /// One attempt: the request, status check and body parse, raced as a
    /// whole against the timeout and the caller's cancellation token.
    async fn attempt(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError> {
        let mut request = self
            .http
            .request(options.method.clone(), url)
            .headers(options.headers.clone());
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        // An absent caller token composes to a token that never fires
        let cancel = options.cancel.clone().unwrap_or_else(CancellationToken::new);
        let timeout = options.timeout;

        let work = async {
            let response = request
                .send()
                .await
                .map_err(|err| FetchError::from_reqwest(&err, timeout))?;

            let status = response.status();
            let status_text = status.canonical_reason().unwrap_or_default().to_string();

            if !status.is_success() {
                return Err(FetchError::Http {
                    status: status.as_u16(),
                    status_text,
                });
            }

            let headers = response.headers().clone();
            let declared_json = headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.contains("application/json"))
                .unwrap_or(false);

            let text = response
                .text()
                .await
                .map_err(|err| FetchError::from_reqwest(&err, timeout))?;

            let data = parse_body(&text, declared_json)?;
            Ok(FetchResult::success(
                status.as_u16(),
                status_text,
                headers,
                data,
            ))
        };

        tokio::select! {
            outcome = work => outcome,
            _ = tokio::time::sleep(timeout) => Err(FetchError::Timeout(timeout)),
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
        }
    }

    /// Terminal failure handling: fallback masking, notification, result.
    fn finish_failure(
        &self,
        url: &str,
        options: &FetchOptions,
        error: FetchError,
    ) -> FetchResult {
        if let Some(fallback) = &options.fallback {
            warn!(%url, %error, "all attempts failed, serving fallback value");
            return FetchResult::fallback(fallback.clone(), &error);
        }

        warn!(%url, %error, "all attempts failed");
        if options.notify_on_error {
            self.notifier.notify(error.kind(), &error.to_string());
        }
        FetchResult::failure(error)
    }

    // == Verb Helpers ==
    /// GET with this client's default options.
    pub async fn get(&self, url: &str) -> FetchResult {
        self.fetch(url, self.options()).await
    }

    /// POST a JSON body with this client's default options.
    pub async fn post(&self, url: &str, body: Value) -> FetchResult {
        self.fetch(url, self.options().with_method(Method::POST).with_body(body))
            .await
    }

    /// PUT a JSON body with this client's default options.
    pub async fn put(&self, url: &str, body: Value) -> FetchResult {
        self.fetch(url, self.options().with_method(Method::PUT).with_body(body))
            .await
    }

    /// PATCH a JSON body with this client's default options.
    pub async fn patch(&self, url: &str, body: Value) -> FetchResult {
        self.fetch(
            url,
            self.options().with_method(Method::PATCH).with_body(body),
        )
        .await
    }

    /// DELETE with this client's default options.
    pub async fn delete(&self, url: &str) -> FetchResult {
        self.fetch(url, self.options().with_method(Method::DELETE))
            .await
    }
}

// == Body Parsing ==
/// Parses a response body by declared content type.
///
/// A declared JSON body must parse as JSON. Anything else is parsed as JSON
/// opportunistically, falling back to the raw text.
fn parse_body(text: &str, declared_json: bool) -> Result<Value, FetchError> {
    if declared_json {
        serde_json::from_str(text).map_err(|err| FetchError::Parse(err.to_string()))
    } else {
        Ok(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
    }
}
