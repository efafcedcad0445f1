//! Error types for the Rowsmith batch generation engine.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! [`BatchErrorKind`] is the taxonomy recorded on failed rows. Generation
//! callables report [`GenerationError`]s, which a classifier maps onto
//! transient or permanent batch errors.
//!
//! # Examples
//!
//! ```
//! use rowsmith_error::{BatchError, BatchErrorKind, RetryableError};
//!
//! let err = BatchError::new(BatchErrorKind::Timeout { timeout_ms: 30_000 });
//! assert!(err.is_retryable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod error;
mod generation;
mod io;

pub use batch::{BatchError, BatchErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{RowsmithError, RowsmithErrorKind, RowsmithResult};
pub use generation::{GenerationError, GenerationErrorKind, RetryableError};
pub use io::{IoError, IoErrorKind};
