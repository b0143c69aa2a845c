//! Fetch Result Module
//!
//! The uniform result shape returned by every fetch call. The wrapper never
//! throws: success, cached reads, masked fallbacks and exhausted failures
//! all come back as a `FetchResult`.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::FetchError;

// == Fetch Result ==
/// Outcome of one logical fetch call.
///
/// Exactly one of `data`/`error` is populated on terminal resolution. When a
/// fallback value masked a failure, `data` holds the fallback and `error` is
/// `None` while `is_timeout`/`is_offline` still describe what actually
/// happened, so `error == None` does not prove the network succeeded.
#[derive(Debug)]
pub struct FetchResult {
    /// The parsed response payload, the cached value, or the fallback
    pub data: Option<Value>,
    /// Terminal error, if the call failed and no fallback was configured
    pub error: Option<FetchError>,
    /// HTTP status of the last received response, 0 if none arrived
    pub status: u16,
    /// Status text matching `status`
    pub status_text: String,
    /// Response headers of the last received response
    pub headers: HeaderMap,
    /// Whether the failure (masked or not) was a timeout
    pub is_timeout: bool,
    /// Whether the failure (masked or not) was an offline failure
    pub is_offline: bool,
    /// Whether `data` was served from the cache without touching the network
    pub from_cache: bool,
    /// When this result was produced
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    // == Constructors ==
    /// A result served from the cache, no network involved.
    pub(crate) fn from_cache(value: Value) -> Self {
        Self {
            data: Some(value),
            error: None,
            status: 200,
            status_text: "OK".to_string(),
            headers: HeaderMap::new(),
            is_timeout: false,
            is_offline: false,
            from_cache: true,
            fetched_at: Utc::now(),
        }
    }

    /// A successful network response.
    pub(crate) fn success(
        status: u16,
        status_text: String,
        headers: HeaderMap,
        data: Value,
    ) -> Self {
        Self {
            data: Some(data),
            error: None,
            status,
            status_text,
            headers,
            is_timeout: false,
            is_offline: false,
            from_cache: false,
            fetched_at: Utc::now(),
        }
    }

    /// A terminal failure, flags derived from the error.
    pub(crate) fn failure(error: FetchError) -> Self {
        let (status, status_text) = match &error {
            FetchError::Http {
                status,
                status_text,
            } => (*status, status_text.clone()),
            _ => (0, String::new()),
        };

        Self {
            data: None,
            is_timeout: error.is_timeout(),
            is_offline: error.is_offline(),
            error: Some(error),
            status,
            status_text,
            headers: HeaderMap::new(),
            from_cache: false,
            fetched_at: Utc::now(),
        }
    }

    /// A failure masked by a configured fallback value.
    pub(crate) fn fallback(value: Value, masked: &FetchError) -> Self {
        Self {
            data: Some(value),
            error: None,
            status: 0,
            status_text: String::new(),
            headers: HeaderMap::new(),
            is_timeout: masked.is_timeout(),
            is_offline: masked.is_offline(),
            from_cache: false,
            fetched_at: Utc::now(),
        }
    }

    // == Accessors ==
    /// Whether the call produced data (network, cache, or fallback).
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.data.is_some()
    }

    /// Deserializes the payload into a typed value.
    ///
    /// Returns `None` when there is no payload or it does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Option<T> {
        self.data
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
