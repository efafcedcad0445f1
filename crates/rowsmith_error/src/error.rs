//! Top-level error wrapper types.

use crate::{BatchError, ConfigError, GenerationError, IoError};

/// Every error the Rowsmith crates can hand back to a caller.
///
/// # Examples
///
/// ```
/// use rowsmith_error::{BatchError, RowsmithError};
///
/// let err: RowsmithError = BatchError::validation("template is empty").into();
/// assert!(format!("{}", err).contains("template is empty"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RowsmithErrorKind {
    /// Batch or row execution error
    #[from(BatchError)]
    Batch(BatchError),
    /// Error reported by a generation callable
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// File read or write error
    #[from(IoError)]
    Io(IoError),
}

/// Rowsmith error with kind discrimination.
///
/// # Examples
///
/// ```
/// use rowsmith_error::{ConfigError, RowsmithResult};
///
/// fn might_fail() -> RowsmithResult<()> {
///     Err(ConfigError::invalid_field("rate_limit_max", "must be positive"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Rowsmith Error: {}", _0)]
pub struct RowsmithError(Box<RowsmithErrorKind>);

impl RowsmithError {
    /// Create a new error from a kind.
    pub fn new(kind: RowsmithErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RowsmithErrorKind {
        &self.0
    }

    /// The batch error inside, if this is one.
    pub fn as_batch(&self) -> Option<&BatchError> {
        match self.kind() {
            RowsmithErrorKind::Batch(err) => Some(err),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to RowsmithErrorKind
impl<T> From<T> for RowsmithError
where
    T: Into<RowsmithErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Rowsmith operations.
pub type RowsmithResult<T> = std::result::Result<T, RowsmithError>;
