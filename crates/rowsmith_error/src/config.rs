//! Configuration error types.

/// Specific configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration source could not be read or merged
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
    /// The merged configuration did not match the expected shape
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
    /// A field holds a value outside its allowed range
    #[display("Invalid value for '{}': {}", field, reason)]
    InvalidField {
        /// The field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
    /// A builder was finished with missing or inconsistent fields
    #[display("Builder failed: {}", _0)]
    Builder(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use rowsmith_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::invalid_field("max_retries", "must be at most 20");
/// assert!(matches!(err.kind(), ConfigErrorKind::InvalidField { .. }));
/// assert!(format!("{}", err).contains("max_retries"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    line: u32,
    file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an out-of-range field.
    #[track_caller]
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidField {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}

impl From<ConfigErrorKind> for ConfigError {
    #[track_caller]
    fn from(kind: ConfigErrorKind) -> Self {
        Self::new(kind)
    }
}
