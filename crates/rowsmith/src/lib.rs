//! Rowsmith: resilient bulk AI generation.
//!
//! Rowsmith turns an ordered set of input rows into reliable calls against a
//! rate-limited, intermittently failing generation service. Each row renders a
//! `{{column}}` prompt template and is executed under a fixed-window rate
//! limiter, exponential backoff with full jitter, a circuit breaker and a
//! per-attempt timeout. A batch coordinator keeps results in row order,
//! publishes progress, and supports cooperative cancellation and resumption.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rowsmith::{BatchConfig, BatchCoordinator, HttpGenerator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = Arc::new(HttpGenerator::new("http://localhost:8080/generate"));
//!     let coordinator = BatchCoordinator::new(BatchConfig::default(), generator)?
//!         .with_progress(|p| println!("{}/{}", p.processed(), p.total()));
//!
//!     let rows = rowsmith::read_rows("rows.json")?;
//!     let summary = coordinator.start("Write a tagline for {{product}}", rows).await?;
//!     println!("{:?}", summary.stats());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - Export tracing spans through OpenTelemetry (stdout exporter)
//!
//! # Architecture
//!
//! - `rowsmith_error` - Error types
//! - `rowsmith_core` - Data model and `BatchConfig`
//! - `rowsmith_rate_limit` - Classifier, rate limiter, retry, circuit breaker, config loading
//! - `rowsmith_batch` - Templates, row executor, batch coordinator
//!
//! This crate (`rowsmith`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;
pub mod observability;
mod rows;

pub use http::HttpGenerator;
pub use observability::{
    ObservabilityConfig, init_observability, init_observability_with_config,
    shutdown_observability,
};
pub use rows::{parse_rows, read_rows};

pub use rowsmith_batch::{
    BatchCoordinator, BatchSummary, CancelHandle, FnGenerator, Generator, RowExecutor, RowOutput,
    generator_fn, placeholders, render_template,
};
pub use rowsmith_core::{
    BatchConfig, BatchConfigBuilder, BatchRun, BatchStats, BatchStatus, ProgressSnapshot, Row,
    RowResult, RowStatus,
};
pub use rowsmith_error::{
    BatchError, BatchErrorKind, ConfigError, ConfigErrorKind, GenerationError,
    GenerationErrorKind, IoError, IoErrorKind, RetryableError, RowsmithError, RowsmithErrorKind, RowsmithResult,
};
pub use rowsmith_rate_limit::{
    BackoffSchedule, CircuitBreaker, CircuitSnapshot, CircuitState, DefaultClassifier,
    ErrorClassifier, LoggingConfig, RateLimiter, Retried, RetryPolicy, RowsmithConfig,
    message_is_transient, status_is_transient,
};
