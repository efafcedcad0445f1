//! Row execution and batch coordination for Rowsmith.
//!
//! This crate turns an ordered list of input rows into calls against a
//! [`Generator`], one rendered prompt per row:
//!
//! - [`render_template`] substitutes `{{column}}` placeholders
//! - [`RowExecutor`] runs one row through the rate limiter, retry policy,
//!   circuit breaker and per-attempt timeout
//! - [`BatchCoordinator`] drives a whole batch with ordered results, progress
//!   snapshots, cooperative cancellation and resumption
//!
//! # Example
//!
//! ```rust,ignore
//! use rowsmith_batch::{BatchCoordinator, generator_fn};
//! use rowsmith_core::BatchConfig;
//! use rowsmith_error::GenerationError;
//! use std::sync::Arc;
//!
//! let generator = generator_fn(|prompt: String| async move {
//!     Ok::<_, GenerationError>(format!("echo: {prompt}"))
//! });
//! let coordinator = BatchCoordinator::new(BatchConfig::default(), Arc::new(generator))?;
//! let summary = coordinator.start("Hello {{name}}", rows).await?;
//! println!("{} of {} rows succeeded", summary.stats().succeeded(), summary.stats().total());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod coordinator;
mod generator;
mod row_executor;
mod template;

pub use coordinator::{BatchCoordinator, BatchSummary, CancelHandle};
pub use generator::{FnGenerator, Generator, generator_fn};
pub use row_executor::{RowExecutor, RowOutput};
pub use template::{placeholders, render_template};
