//! Per-row outcomes.

use crate::Row;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Terminal status of a single row.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RowStatus {
    /// The generator produced text.
    Success,
    /// Every attempt failed; the error message is kept.
    Error,
    /// The row was abandoned because the batch was cancelled.
    ///
    /// The coordinator leaves rows it never dispatched unrecorded, so they can
    /// be resumed. This status is for callers that materialize those rows,
    /// such as exporters.
    Cancelled,
}

/// Outcome of executing one row.
///
/// Results are built once through the constructors below and never mutated.
///
/// # Examples
///
/// ```
/// use rowsmith_core::{Row, RowResult, RowStatus};
/// use std::collections::HashMap;
///
/// let row = Row::new(2, HashMap::new());
/// let result = RowResult::failed(&row, "HTTP 400 error: bad request", 0);
/// assert_eq!(*result.status(), RowStatus::Error);
/// assert_eq!(*result.row_index(), 2);
/// assert!(result.output().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RowResult {
    /// Position of the row within the batch.
    row_index: usize,
    /// The row's input record, as read.
    input: HashMap<String, String>,
    /// Generated text, empty unless the row succeeded.
    output: String,
    /// Terminal status.
    status: RowStatus,
    /// Error message for failed rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Retries consumed beyond the first attempt.
    retries: u32,
}

impl RowResult {
    /// A row that produced text.
    pub fn success(row: &Row, output: impl Into<String>, retries: u32) -> Self {
        Self {
            row_index: *row.index(),
            input: row.input().clone(),
            output: output.into(),
            status: RowStatus::Success,
            error: None,
            retries,
        }
    }

    /// A row whose attempts were exhausted or permanently rejected.
    pub fn failed(row: &Row, message: impl Into<String>, retries: u32) -> Self {
        Self {
            row_index: *row.index(),
            input: row.input().clone(),
            output: String::new(),
            status: RowStatus::Error,
            error: Some(message.into()),
            retries,
        }
    }

    /// A row that was abandoned by cancellation.
    ///
    /// Never produced by the batch coordinator itself; see [`RowStatus::Cancelled`].
    pub fn cancelled(row: &Row) -> Self {
        Self {
            row_index: *row.index(),
            input: row.input().clone(),
            output: String::new(),
            status: RowStatus::Cancelled,
            error: None,
            retries: 0,
        }
    }

    /// Whether the row produced text.
    pub fn is_success(&self) -> bool {
        self.status == RowStatus::Success
    }
}
