//! Batch run state.

use crate::{BatchStats, RowResult, RowStatus};
use chrono::{DateTime, Utc};
use rowsmith_error::{BatchError, BatchErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a batch run.
///
/// Transitions only move forward:
///
/// ```text
/// Pending ──> Processing ──> Completed
///    │            ├────────> Failed
///    └────────────┴────────> Cancelled
/// ```
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
pub enum BatchStatus {
    /// Created, not yet started.
    Pending,
    /// Rows are being executed.
    Processing,
    /// Every row has a result.
    Completed,
    /// The run stopped on an internal failure.
    Failed,
    /// The run was cancelled between rows.
    Cancelled,
}

impl BatchStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchStatus::Completed | BatchStatus::Failed | BatchStatus::Cancelled
        )
    }

    /// Whether `self -> next` is a legal move within one run.
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (BatchStatus::Pending, BatchStatus::Processing)
                | (BatchStatus::Pending, BatchStatus::Cancelled)
                | (BatchStatus::Processing, BatchStatus::Completed)
                | (BatchStatus::Processing, BatchStatus::Failed)
                | (BatchStatus::Processing, BatchStatus::Cancelled)
        )
    }
}

/// One execution of a batch: status plus a result slot per row.
///
/// Slots are pre-sized to the row count so results land by row index regardless
/// of completion order. A filled slot is never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRun {
    id: Uuid,
    status: BatchStatus,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    cancelled: bool,
    slots: Vec<Option<RowResult>>,
}

impl BatchRun {
    /// A fresh pending run for `total` rows.
    pub fn new(total: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: BatchStatus::Pending,
            started_at: None,
            finished_at: None,
            cancelled: false,
            slots: vec![None; total],
        }
    }

    /// A fresh pending run that keeps every result already recorded in `previous`.
    pub fn resumed_from(previous: &BatchRun) -> Self {
        Self {
            slots: previous.slots.clone(),
            ..Self::new(0)
        }
    }

    /// Run identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current status.
    pub fn status(&self) -> BatchStatus {
        self.status
    }

    /// When processing began.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// When the run reached a terminal status.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Rows in the batch.
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Move to `next`, stamping start and finish times.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when the move would go backwards or leave a
    /// terminal status.
    #[track_caller]
    pub fn transition(&mut self, next: BatchStatus) -> Result<(), BatchError> {
        if !self.status.can_transition_to(next) {
            return Err(BatchError::new(BatchErrorKind::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            }));
        }
        match next {
            BatchStatus::Processing => self.started_at = Some(Utc::now()),
            BatchStatus::Cancelled => {
                self.cancelled = true;
                self.finished_at = Some(Utc::now());
            }
            BatchStatus::Completed | BatchStatus::Failed => self.finished_at = Some(Utc::now()),
            BatchStatus::Pending => {}
        }
        self.status = next;
        Ok(())
    }

    /// Record a row's result in its slot.
    ///
    /// Returns false when the index is out of range or the slot is already filled.
    pub fn record(&mut self, result: RowResult) -> bool {
        let Some(slot) = self.slots.get_mut(*result.row_index()) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(result);
        true
    }

    /// Whether the row at `index` already has a result.
    pub fn is_recorded(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Indices of rows without a result, in order.
    pub fn pending_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.is_none().then_some(index))
            .collect()
    }

    /// Rows with a recorded result.
    pub fn processed(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Recorded results in row-index order.
    pub fn results(&self) -> Vec<RowResult> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Aggregate counts over the recorded results.
    pub fn stats(&self) -> BatchStats {
        let (mut succeeded, mut failed, mut cancelled) = (0, 0, 0);
        for result in self.slots.iter().flatten() {
            match result.status() {
                RowStatus::Success => succeeded += 1,
                RowStatus::Error => failed += 1,
                RowStatus::Cancelled => cancelled += 1,
            }
        }
        BatchStats::new(
            self.total(),
            succeeded + failed + cancelled,
            succeeded,
            failed,
            cancelled,
        )
    }
}
