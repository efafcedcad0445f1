//! Rate limiting and error recovery for Rowsmith.
//!
//! The pieces here wrap every call to a generation service:
//!
//! - [`ErrorClassifier`] / [`DefaultClassifier`] decide which failures are transient
//! - [`RateLimiter`] grants a fixed number of permits per window and never queues
//! - [`RetryPolicy`] retries transient failures with capped exponential backoff and full jitter
//! - [`CircuitBreaker`] fails fast after repeated failures and probes for recovery
//! - [`RowsmithConfig`] loads layered TOML and environment configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod circuit;
mod classifier;
mod config;
mod limiter;
mod retry;

pub use circuit::{CircuitBreaker, CircuitSnapshot, CircuitState};
pub use classifier::{DefaultClassifier, ErrorClassifier, message_is_transient, status_is_transient};
pub use config::{DEFAULT_CONFIG, LoggingConfig, RowsmithConfig};
pub use limiter::RateLimiter;
pub use retry::{BackoffSchedule, Retried, RetryPolicy};
