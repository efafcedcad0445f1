//! Progress snapshots and aggregate statistics.

use crate::BatchStatus;
use serde::{Deserialize, Serialize};

/// Read-only view of a run, emitted after every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ProgressSnapshot {
    /// Rows with a recorded result.
    processed: usize,
    /// Rows in the batch.
    total: usize,
    /// Milliseconds since the run started.
    elapsed_ms: u64,
    /// Run status at the time of the snapshot.
    status: BatchStatus,
}

impl ProgressSnapshot {
    /// Create a snapshot.
    pub fn new(processed: usize, total: usize, elapsed_ms: u64, status: BatchStatus) -> Self {
        Self {
            processed,
            total,
            elapsed_ms,
            status,
        }
    }

    /// Completion as a percentage in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.processed as f64 * 100.0 / self.total as f64
    }
}

/// Aggregate counts for a run, computed on demand from its results.
///
/// # Examples
///
/// ```
/// use rowsmith_core::BatchStats;
///
/// let stats = BatchStats::new(10, 4, 3, 1, 0);
/// assert_eq!(*stats.success_rate(), 0.75);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct BatchStats {
    /// Rows in the batch.
    total: usize,
    /// Rows with a recorded result.
    processed: usize,
    /// Rows that produced text.
    succeeded: usize,
    /// Rows that ended in error.
    failed: usize,
    /// Results explicitly recorded as cancelled. Rows skipped by a cancelled
    /// run have no result and count toward `remaining()` instead.
    cancelled: usize,
    /// `succeeded / processed`, or 0 when nothing was processed.
    success_rate: f64,
}

impl BatchStats {
    /// Build stats from raw counts.
    pub fn new(
        total: usize,
        processed: usize,
        succeeded: usize,
        failed: usize,
        cancelled: usize,
    ) -> Self {
        let success_rate = if processed == 0 {
            0.0
        } else {
            succeeded as f64 / processed as f64
        };
        Self {
            total,
            processed,
            succeeded,
            failed,
            cancelled,
            success_rate,
        }
    }

    /// Rows not yet processed.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed)
    }
}
