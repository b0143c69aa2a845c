//! Error types for the fetch layer
//!
//! Provides unified error handling using thiserror.
//!
//! Classification matters here: only timeout and offline failures are
//! retried, everything else is terminal on first occurrence. The cache store
//! has no error type of its own, none of its operations can fail.

use std::time::Duration;

use thiserror::Error;

use crate::notify::FailureKind;

// == Fetch Error Enum ==
/// Unified error type for fetch attempts.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The attempt did not complete within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The transport reported no connectivity
    #[error("network unavailable: {0}")]
    Offline(String),

    /// A response was received with a non-success status
    #[error("unexpected status {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// The response body could not be interpreted
    #[error("failed to decode response body: {0}")]
    Parse(String),

    /// The caller's cancellation token aborted the attempt
    #[error("request cancelled by caller")]
    Cancelled,

    /// Any other transport-level failure
    #[error("request failed: {0}")]
    Transport(String),

    /// Terminal state after all retries were consumed
    #[error("all {attempts} attempts failed, last error: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    // == Classification ==
    /// Classifies a transport error using the runtime's own flags first and
    /// the error text second.
    ///
    /// Text matching is part of the contract: an error whose chain mentions
    /// "timeout" is a timeout, one mentioning "network", "offline" or
    /// "connection" is an offline failure.
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return FetchError::Timeout(timeout);
        }
        if err.is_connect() {
            return FetchError::Offline(error_chain_text(err));
        }

        let text = error_chain_text(err);
        let lowered = text.to_lowercase();
        if lowered.contains("timeout") {
            FetchError::Timeout(timeout)
        } else if lowered.contains("network")
            || lowered.contains("offline")
            || lowered.contains("connection")
        {
            FetchError::Offline(text)
        } else {
            FetchError::Transport(text)
        }
    }

    // == Is Retryable ==
    /// Whether another attempt may succeed.
    ///
    /// Only timeout and offline failures are retried; HTTP status errors,
    /// parse errors and cancellation are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout(_) | FetchError::Offline(_))
    }

    /// Whether this failure (or the last failure behind an exhausted retry
    /// chain) was a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Exhausted { last, .. } => last.is_timeout(),
            _ => false,
        }
    }

    /// Whether this failure (or the last failure behind an exhausted retry
    /// chain) was an offline failure.
    pub fn is_offline(&self) -> bool {
        match self {
            FetchError::Offline(_) => true,
            FetchError::Exhausted { last, .. } => last.is_offline(),
            _ => false,
        }
    }

    // == Failure Kind ==
    /// Maps the error to the user-facing notification category.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout(_) => FailureKind::Timeout,
            FetchError::Offline(_) => FailureKind::Offline,
            FetchError::Http { .. } => FailureKind::Http,
            FetchError::Exhausted { last, .. } => last.kind(),
            _ => FailureKind::Other,
        }
    }
}

// == Utility Functions ==
/// Flattens an error and its source chain into one message.
fn error_chain_text(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}
