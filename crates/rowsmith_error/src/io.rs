//! File input and output errors.

/// Kinds of file errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum IoErrorKind {
    /// Failed to read an input file
    #[display("Failed to read {}: {}", path, message)]
    FileRead {
        /// File that could not be read
        path: String,
        /// Underlying error message
        message: String,
    },
    /// Failed to write an output file
    #[display("Failed to write {}: {}", path, message)]
    FileWrite {
        /// File that could not be written
        path: String,
        /// Underlying error message
        message: String,
    },
    /// Failed to encode output before writing
    #[display("Failed to encode output: {}", _0)]
    Encode(String),
}

/// File error with location tracking.
///
/// # Examples
///
/// ```
/// use rowsmith_error::{IoError, IoErrorKind};
///
/// let err = IoError::read("rows.json", "No such file or directory");
/// assert!(matches!(err.kind(), IoErrorKind::FileRead { .. }));
/// assert!(format!("{}", err).contains("Failed to read rows.json"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("IO Error: {} at line {} in {}", kind, line, file)]
pub struct IoError {
    /// The kind of error that occurred
    pub kind: IoErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl IoError {
    /// Create a new file error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IoErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a read failure.
    #[track_caller]
    pub fn read(path: impl Into<String>, message: impl ToString) -> Self {
        Self::new(IoErrorKind::FileRead {
            path: path.into(),
            message: message.to_string(),
        })
    }

    /// Shorthand for a write failure.
    #[track_caller]
    pub fn write(path: impl Into<String>, message: impl ToString) -> Self {
        Self::new(IoErrorKind::FileWrite {
            path: path.into(),
            message: message.to_string(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &IoErrorKind {
        &self.kind
    }
}
