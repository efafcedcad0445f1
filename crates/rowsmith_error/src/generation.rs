//! Errors raised by generation callables and the retry contract.

/// Failure conditions a generation callable can report.
///
/// A generator is anything that renders a prompt to text. It reports *what* went
/// wrong here; whether the failure is worth retrying is decided by an
/// `ErrorClassifier`, which starts from [`GenerationErrorKind::is_retryable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Connection could not be established or was dropped
    #[display("Network error: {}", _0)]
    Network(String),
    /// The request was aborted before a response arrived
    #[display("Request aborted: {}", _0)]
    Aborted(String),
    /// The generation service reported a timeout
    #[display("Request timed out: {}", _0)]
    Timeout(String),
    /// The prompt or parameters were rejected
    #[display("Validation failed: {}", _0)]
    Validation(String),
    /// The input could not be understood
    #[display("Malformed input: {}", _0)]
    MalformedInput(String),
    /// Opaque failure carrying only a message
    #[display("{}", _0)]
    Other(String),
}

impl GenerationErrorKind {
    /// Check if this error type should be retried.
    ///
    /// `Other` is never retryable here; message heuristics for opaque errors
    /// live in the classifier.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429) || (500..600).contains(status_code)
            }
            GenerationErrorKind::Network(_) => true,
            GenerationErrorKind::Aborted(_) => true,
            GenerationErrorKind::Timeout(_) => true,
            _ => false,
        }
    }

    /// HTTP status code, if the failure came from an HTTP response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GenerationErrorKind::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use rowsmith_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Http {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(format!("{}", err).contains("HTTP 503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an HTTP failure.
    #[track_caller]
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Http {
            status_code,
            message: message.into(),
        })
    }

    /// Shorthand for an opaque failure.
    #[track_caller]
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(GenerationErrorKind::Other(message.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GenerationErrorKind {
        &self.kind
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use rowsmith_error::{GenerationError, RetryableError};
///
/// let err = GenerationError::http(429, "Too many requests");
/// assert!(err.is_retryable());
///
/// let err = GenerationError::http(401, "Unauthorized");
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or network timeouts should return true. Permanent errors like 401
    /// (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for GenerationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
