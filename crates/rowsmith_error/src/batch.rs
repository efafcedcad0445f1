//! Batch execution error taxonomy.

use crate::RetryableError;

/// Everything that can go wrong while executing a row or driving a batch.
///
/// Row-level kinds (`RateLimitExceeded` through `CircuitOpen`) are recorded on the
/// failing row's result. `Validation`, `AlreadyProcessing` and `InvalidTransition`
/// are returned to the caller before any row runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BatchErrorKind {
    /// Template, rows or configuration rejected before the run starts
    #[display("Validation error: {}", _0)]
    Validation(String),
    /// The rate limiter denied a permit
    #[display("Rate limit exceeded: {} requests per {}ms", max, window_ms)]
    RateLimitExceeded {
        /// Permits granted per window
        max: u32,
        /// Window length in milliseconds
        window_ms: u64,
    },
    /// The per-row deadline elapsed before the generator settled
    #[display("Row timed out after {}ms", timeout_ms)]
    Timeout {
        /// Deadline in milliseconds
        timeout_ms: u64,
    },
    /// Retryable failure from the generation service
    #[display("Transient service error: {}", _0)]
    TransientService(String),
    /// Non-retryable failure from the generation service
    #[display("Permanent service error: {}", _0)]
    PermanentService(String),
    /// The generator returned no text
    #[display("Empty response from generation service")]
    EmptyResponse,
    /// The circuit breaker refused the call without invoking the service
    #[display("Circuit open: retry in {}ms", retry_in_ms)]
    CircuitOpen {
        /// Time until the breaker will allow a probe
        retry_in_ms: u64,
    },
    /// `start` was called while a run is in progress
    #[display("Batch is already processing")]
    AlreadyProcessing,
    /// The requested status change is not allowed
    #[display("Cannot move batch from {} to {}", from, to)]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },
}

impl BatchErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BatchErrorKind::Timeout { .. }
                | BatchErrorKind::TransientService(_)
                | BatchErrorKind::EmptyResponse
        )
    }
}

/// Batch error with attempt count and source location tracking.
///
/// # Examples
///
/// ```
/// use rowsmith_error::{BatchError, BatchErrorKind};
///
/// let err = BatchError::new(BatchErrorKind::EmptyResponse).with_attempts(4);
/// assert_eq!(err.attempts(), 4);
/// assert!(format!("{}", err).contains("Empty response"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Batch Error: {} (attempts: {}) at line {} in {}", kind, attempts, line, file)]
pub struct BatchError {
    kind: BatchErrorKind,
    attempts: u32,
    line: u32,
    file: &'static str,
}

impl BatchError {
    /// Create a new batch error with caller location tracking.
    #[track_caller]
    pub fn new(kind: BatchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            attempts: 1,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a validation failure.
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(BatchErrorKind::Validation(message.into()))
    }

    /// Tag the error with the number of attempts made before giving up.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BatchErrorKind {
        &self.kind
    }

    /// Number of attempts made, including the first.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Line where the error was created.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }
}

impl RetryableError for BatchError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl From<BatchErrorKind> for BatchError {
    #[track_caller]
    fn from(kind: BatchErrorKind) -> Self {
        Self::new(kind)
    }
}
