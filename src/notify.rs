//! Failure Notification Module
//!
//! User-facing reporting of exhausted fetch failures. The fetch layer never
//! surfaces errors by throwing, so this sink is how an application shows a
//! "request failed" message to its user. The default sink logs a warning;
//! applications plug in their own toast/banner implementation.

use tracing::warn;

// == Failure Kind ==
/// Category of a terminal fetch failure, selecting the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request did not complete in time
    Timeout,
    /// No network connectivity
    Offline,
    /// A response arrived with an error status
    Http,
    /// Anything else
    Other,
}

impl FailureKind {
    /// The fixed user-facing message for this category.
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "Request timed out. Please try again.",
            FailureKind::Offline => "You appear to be offline. Check your connection.",
            FailureKind::Http => "The server could not process the request.",
            FailureKind::Other => "Something went wrong. Please try again.",
        }
    }
}

// == Error Notifier ==
/// Sink for user-visible failure notifications.
///
/// Implementations must be cheap and non-blocking; they are invoked inline
/// on the fetch path after retries are exhausted.
pub trait ErrorNotifier: Send + Sync {
    /// Reports a terminal failure to the user.
    ///
    /// # Arguments
    /// * `kind` - The failure category
    /// * `detail` - The underlying error text, for logging or debug surfaces
    fn notify(&self, kind: FailureKind, detail: &str);
}

// == Tracing Notifier ==
/// Default notifier that logs failures as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ErrorNotifier for TracingNotifier {
    fn notify(&self, kind: FailureKind, detail: &str) {
        warn!(message = kind.message(), %detail, "request failed");
    }
}
