//! Transient/permanent error classification.
//!
//! The retry executor and the row executor never decide on their own whether a
//! failure is worth another attempt; they ask an [`ErrorClassifier`]. The
//! [`DefaultClassifier`] treats network failures, timeouts, aborts, empty
//! responses and HTTP 408/429/5xx as transient, and everything else as permanent.

use regex::Regex;
use rowsmith_error::{BatchError, BatchErrorKind, GenerationError, GenerationErrorKind};
use std::sync::LazyLock;

/// Substrings that mark an opaque error message as a transport-level failure.
const TRANSIENT_MARKERS: &[&str] = &[
    "network",
    "fetch failed",
    "econnreset",
    "econnrefused",
    "etimedout",
    "enotfound",
    "socket hang up",
    "connection reset",
    "connection refused",
    "timed out",
    "timeout",
    "abort",
    "rate limit",
    "too many requests",
    "overloaded",
    "service unavailable",
    "bad gateway",
];

/// Matches an HTTP status code embedded in a message, e.g. `status 503` or `HTTP 429`.
static STATUS_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:status|http|code)\s*[:=]?\s*(\d{3})\b").ok());

/// Decides whether a failed attempt should be retried.
///
/// Closures implement the trait, so tests and callers can inject a fixed policy:
///
/// ```
/// use rowsmith_error::{BatchError, BatchErrorKind};
/// use rowsmith_rate_limit::ErrorClassifier;
///
/// let never = |_: &BatchError| false;
/// let err = BatchError::new(BatchErrorKind::TransientService("HTTP 503".into()));
/// assert!(!never.is_retryable(&err));
/// ```
pub trait ErrorClassifier: Send + Sync {
    /// Returns true if the failure is transient.
    fn is_retryable(&self, error: &BatchError) -> bool;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&BatchError) -> bool + Send + Sync,
{
    fn is_retryable(&self, error: &BatchError) -> bool {
        self(error)
    }
}

/// Classifier backed by the error taxonomy plus message heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl DefaultClassifier {
    /// Create the default classifier.
    pub fn new() -> Self {
        Self
    }

    /// Map a generator failure onto a transient or permanent batch error.
    ///
    /// The generator's message is kept verbatim inside the batch error.
    #[track_caller]
    pub fn classify(&self, error: &GenerationError) -> BatchError {
        let message = error.kind().to_string();
        let kind = if self.is_transient(error) {
            BatchErrorKind::TransientService(message)
        } else {
            BatchErrorKind::PermanentService(message)
        };
        BatchError::new(kind)
    }

    /// Whether a generator failure is transient.
    pub fn is_transient(&self, error: &GenerationError) -> bool {
        match error.kind() {
            GenerationErrorKind::Other(message) => message_is_transient(message),
            kind => kind.is_retryable(),
        }
    }
}

impl ErrorClassifier for DefaultClassifier {
    fn is_retryable(&self, error: &BatchError) -> bool {
        error.kind().is_retryable()
    }
}

/// Classify an opaque message.
///
/// An embedded status code wins over keywords, so `HTTP 400: invalid timeout
/// parameter` stays permanent.
pub fn message_is_transient(message: &str) -> bool {
    if let Some(status) = embedded_status(message) {
        return status_is_transient(status);
    }
    let lowered = message.to_lowercase();
    TRANSIENT_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Whether an HTTP status code is worth retrying.
pub fn status_is_transient(status: u16) -> bool {
    matches!(status, 408 | 429) || (500..600).contains(&status)
}

fn embedded_status(message: &str) -> Option<u16> {
    let pattern = STATUS_PATTERN.as_ref()?;
    pattern
        .captures(message)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
        .filter(|status| (100..600).contains(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_status_is_extracted() {
        assert_eq!(embedded_status("request failed with status 503"), Some(503));
        assert_eq!(embedded_status("HTTP 429 Too Many Requests"), Some(429));
        assert_eq!(embedded_status("error code: 400"), Some(400));
        assert_eq!(embedded_status("no digits here"), None);
        assert_eq!(embedded_status("status 999"), None);
    }
}
