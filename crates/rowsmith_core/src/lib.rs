//! Core data types for the Rowsmith batch generation engine.
//!
//! This crate provides the data model shared by the rate limiting and batch
//! crates: rows, row results, batch runs, progress snapshots and the batch
//! configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod progress;
mod result;
mod row;

pub use batch::{BatchRun, BatchStatus};
pub use config::{BatchConfig, BatchConfigBuilder};
pub use progress::{BatchStats, ProgressSnapshot};
pub use result::{RowResult, RowStatus};
pub use row::Row;
