//! Batch coordination: ordered results, progress, cancellation and resumption.
//!
//! A [`BatchCoordinator`] owns one [`BatchRun`] at a time. Rows are dispatched
//! in index order to a worker pool bounded by `concurrency` (1 means strictly
//! sequential); every worker writes its result into the run's slot for that row,
//! so output order never depends on completion order.
//!
//! Cancellation is cooperative: the token is checked before each row is
//! dispatched, and rows already in flight finish and are recorded.

use crate::{Generator, RowExecutor};
use derive_getters::Getters;
use parking_lot::{Mutex, RwLock};
use rowsmith_core::{
    BatchConfig, BatchRun, BatchStats, BatchStatus, ProgressSnapshot, Row, RowResult,
};
use rowsmith_error::{BatchError, BatchErrorKind};
use rowsmith_rate_limit::{CircuitBreaker, ErrorClassifier, RateLimiter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct BatchSummary {
    /// Run identifier.
    run_id: Uuid,
    /// Final status.
    status: BatchStatus,
    /// Aggregate counts.
    stats: BatchStats,
    /// Wall time of the run in milliseconds.
    elapsed_ms: u64,
}

/// Everything one run needs, swapped wholesale by `start` and `resume`.
struct RunState {
    run: BatchRun,
    rows: Arc<Vec<Row>>,
    template: Arc<str>,
    token: CancellationToken,
    clock: Instant,
    // A drive loop is still collecting workers, even if the run was cancelled.
    draining: bool,
}

impl RunState {
    fn idle() -> Self {
        Self {
            run: BatchRun::new(0),
            rows: Arc::new(Vec::new()),
            template: Arc::from(""),
            token: CancellationToken::new(),
            clock: Instant::now(),
            draining: false,
        }
    }

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.run.processed(),
            self.run.total(),
            self.clock.elapsed().as_millis() as u64,
            self.run.status(),
        )
    }
}

struct Shared {
    state: Mutex<RunState>,
    // Serializes progress emission so observers see `processed` in order.
    emit: Mutex<()>,
    progress_tx: watch::Sender<ProgressSnapshot>,
    callback: RwLock<Option<ProgressCallback>>,
}

impl Shared {
    fn cancel(&self) {
        let mut state = self.state.lock();
        let status = state.run.status();
        if status.is_terminal() {
            debug!(%status, "Cancel ignored for finished run");
            return;
        }
        state.token.cancel();
        if state.run.transition(BatchStatus::Cancelled).is_ok() {
            info!(run_id = %state.run.id(), processed = state.run.processed(), "Batch cancelled");
        }
    }

    /// Record a row result for `run_id` and publish progress.
    fn record(&self, run_id: Uuid, result: RowResult) {
        let _emitting = self.emit.lock();
        let snapshot = {
            let mut state = self.state.lock();
            if state.run.id() != run_id {
                debug!(%run_id, "Dropping result from superseded run");
                return;
            }
            if !state.run.record(result) {
                warn!(%run_id, "Row result already recorded");
                return;
            }
            state.snapshot()
        };
        self.publish(snapshot);
    }

    fn publish(&self, snapshot: ProgressSnapshot) {
        self.progress_tx.send_replace(snapshot);
        let callback = self.callback.read().clone();
        if let Some(callback) = callback {
            callback(snapshot);
        }
    }
}

/// Clears the draining flag when a drive ends, including when its future is dropped.
///
/// A dropped drive aborts its workers, so a run still processing is cancelled.
struct ActiveDrive<'a> {
    shared: &'a Shared,
}

impl Drop for ActiveDrive<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        if !state.draining {
            return;
        }
        state.draining = false;
        state.token.cancel();
        if state.run.transition(BatchStatus::Cancelled).is_ok() {
            warn!(run_id = %state.run.id(), "Batch abandoned before finishing");
        }
    }
}

/// Cancels the coordinator's current run from anywhere, including progress callbacks.
#[derive(Clone)]
pub struct CancelHandle {
    shared: Arc<Shared>,
}

impl CancelHandle {
    /// Request cooperative cancellation of the current run.
    pub fn cancel(&self) {
        self.shared.cancel();
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

/// Drives a batch of rows through a [`RowExecutor`].
///
/// # Example
///
/// ```rust,ignore
/// let coordinator = BatchCoordinator::new(BatchConfig::default(), Arc::new(generator))?
///     .with_progress(|snapshot| println!("{:.0}%", snapshot.percent()));
///
/// let summary = coordinator.start("Describe {{product}}", rows).await?;
/// for result in coordinator.results() {
///     println!("{}: {}", result.row_index(), result.output());
/// }
/// ```
pub struct BatchCoordinator {
    config: BatchConfig,
    executor: RowExecutor,
    generator: Arc<dyn Generator>,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl BatchCoordinator {
    /// Create a coordinator with its own limiter and breaker.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `config` holds out-of-range values.
    pub fn new(config: BatchConfig, generator: Arc<dyn Generator>) -> Result<Self, BatchError> {
        config
            .validate()
            .map_err(|e| BatchError::validation(e.kind().to_string()))?;
        let executor = RowExecutor::new(&config);
        let state = RunState::idle();
        let (progress_tx, _) = watch::channel(state.snapshot());
        Ok(Self {
            config,
            executor,
            generator,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                emit: Mutex::new(()),
                progress_tx,
                callback: RwLock::new(None),
            }),
        })
    }

    /// Call `callback` with a snapshot after every row and when the run ends.
    pub fn with_progress<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressSnapshot) + Send + Sync + 'static,
    {
        let callback: ProgressCallback = Arc::new(callback);
        *self.shared.callback.write() = Some(callback);
        self
    }

    /// Share a rate limiter with other coordinators.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.executor = self.executor.with_rate_limiter(limiter);
        self
    }

    /// Share a circuit breaker with other coordinators.
    pub fn with_circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.executor = self.executor.with_circuit_breaker(breaker);
        self
    }

    /// Replace the retry decision.
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.executor = self.executor.with_classifier(classifier);
        self
    }

    /// The configuration in effect.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// The row executor in use.
    pub fn executor(&self) -> &RowExecutor {
        &self.executor
    }

    /// Receive progress snapshots as they are published.
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.shared.progress_tx.subscribe()
    }

    /// A handle that can cancel runs of this coordinator.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Process `rows` with `template` in a fresh run.
    ///
    /// Allowed while pending or after a cancelled run. Row failures are
    /// recorded on their results and never abort the batch.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank template or no rows
    /// - `AlreadyProcessing` while a run is in progress, or while rows of a
    ///   cancelled run are still finishing
    /// - `InvalidTransition` after a completed or failed run; use [`resume`](Self::resume)
    ///   or a new coordinator instead
    #[instrument(skip(self, template, rows))]
    pub async fn start<I>(&self, template: &str, rows: I) -> Result<BatchSummary, BatchError>
    where
        I: IntoIterator<Item = HashMap<String, String>>,
    {
        if template.trim().is_empty() {
            return Err(BatchError::validation("template is empty"));
        }
        let rows = Row::from_records(rows);
        if rows.is_empty() {
            return Err(BatchError::validation("no rows to process"));
        }

        let (run_id, token, indices) = {
            let mut state = self.shared.state.lock();
            if state.draining {
                return Err(BatchError::new(BatchErrorKind::AlreadyProcessing));
            }
            match state.run.status() {
                BatchStatus::Processing => {
                    return Err(BatchError::new(BatchErrorKind::AlreadyProcessing));
                }
                BatchStatus::Completed | BatchStatus::Failed => {
                    return Err(BatchError::new(BatchErrorKind::InvalidTransition {
                        from: state.run.status().to_string(),
                        to: BatchStatus::Processing.to_string(),
                    }));
                }
                BatchStatus::Pending | BatchStatus::Cancelled => {}
            }

            let mut run = BatchRun::new(rows.len());
            run.transition(BatchStatus::Processing)?;
            let indices = run.pending_indices();
            *state = RunState {
                run,
                rows: Arc::new(rows),
                template: Arc::from(template),
                token: CancellationToken::new(),
                clock: Instant::now(),
                draining: true,
            };
            (state.run.id(), state.token.clone(), indices)
        };

        info!(%run_id, rows = indices.len(), concurrency = *self.config.concurrency(), "Batch started");
        self.drive(run_id, token, indices).await
    }

    /// Continue a cancelled or failed run, processing only rows without a result.
    ///
    /// The resumed run keeps every recorded result and gets a new run id.
    ///
    /// # Errors
    ///
    /// - `AlreadyProcessing` while a run is in progress, or while rows of a
    ///   cancelled run are still finishing
    /// - `InvalidTransition` unless the last run was cancelled or failed
    /// - `Validation` if no batch was ever started
    #[instrument(skip(self))]
    pub async fn resume(&self) -> Result<BatchSummary, BatchError> {
        let (run_id, token, indices) = {
            let mut state = self.shared.state.lock();
            if state.draining {
                return Err(BatchError::new(BatchErrorKind::AlreadyProcessing));
            }
            match state.run.status() {
                BatchStatus::Processing => {
                    return Err(BatchError::new(BatchErrorKind::AlreadyProcessing));
                }
                BatchStatus::Cancelled | BatchStatus::Failed => {}
                status => {
                    return Err(BatchError::new(BatchErrorKind::InvalidTransition {
                        from: status.to_string(),
                        to: BatchStatus::Processing.to_string(),
                    }));
                }
            }
            if state.rows.is_empty() {
                return Err(BatchError::validation("no batch to resume"));
            }

            let previous = state.run.id();
            let mut run = BatchRun::resumed_from(&state.run);
            run.transition(BatchStatus::Processing)?;
            let indices = run.pending_indices();
            state.run = run;
            state.token = CancellationToken::new();
            state.clock = Instant::now();
            state.draining = true;
            info!(%previous, run_id = %state.run.id(), remaining = indices.len(), "Batch resumed");
            (state.run.id(), state.token.clone(), indices)
        };

        self.drive(run_id, token, indices).await
    }

    async fn drive(
        &self,
        run_id: Uuid,
        token: CancellationToken,
        indices: Vec<usize>,
    ) -> Result<BatchSummary, BatchError> {
        let (rows, template) = {
            let state = self.shared.state.lock();
            (Arc::clone(&state.rows), Arc::clone(&state.template))
        };
        let _active = ActiveDrive {
            shared: &self.shared,
        };
        let executor = Arc::new(self.executor.clone());
        let semaphore = Arc::new(Semaphore::new(*self.config.concurrency()));
        let mut workers = JoinSet::new();

        for index in indices {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            if token.is_cancelled() {
                debug!(%run_id, next_row = index, "Cancellation observed, stopping dispatch");
                break;
            }

            let rows = Arc::clone(&rows);
            let template = Arc::clone(&template);
            let executor = Arc::clone(&executor);
            let generator = Arc::clone(&self.generator);
            let shared = Arc::clone(&self.shared);
            workers.spawn(async move {
                let Some(row) = rows.get(index) else {
                    return;
                };
                let result = match executor
                    .execute_row(&template, row.input(), generator.as_ref())
                    .await
                {
                    Ok(output) => RowResult::success(row, output.text, output.retries),
                    Err(e) => {
                        warn!(row = index, error = %e.kind(), "Row failed");
                        let retries = e.attempts().saturating_sub(1);
                        RowResult::failed(row, e.kind().to_string(), retries)
                    }
                };
                shared.record(run_id, result);
                drop(permit);
            });
        }

        let mut panicked = false;
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(%run_id, error = %e, "Row worker failed");
                panicked = true;
            }
        }

        self.finish(run_id, panicked)
    }

    fn finish(&self, run_id: Uuid, panicked: bool) -> Result<BatchSummary, BatchError> {
        let _emitting = self.shared.emit.lock();
        let (summary, snapshot) = {
            let mut state = self.shared.state.lock();
            if state.run.id() != run_id {
                return Err(BatchError::new(BatchErrorKind::InvalidTransition {
                    from: format!("run {run_id}"),
                    to: format!("run {}", state.run.id()),
                }));
            }
            state.draining = false;
            if state.run.status() == BatchStatus::Processing {
                let next = if panicked {
                    BatchStatus::Failed
                } else {
                    BatchStatus::Completed
                };
                state.run.transition(next)?;
            }
            let snapshot = state.snapshot();
            let summary = BatchSummary {
                run_id,
                status: state.run.status(),
                stats: state.run.stats(),
                elapsed_ms: *snapshot.elapsed_ms(),
            };
            (summary, snapshot)
        };

        info!(
            %run_id,
            status = %summary.status,
            succeeded = *summary.stats.succeeded(),
            failed = *summary.stats.failed(),
            "Batch finished"
        );
        self.shared.publish(snapshot);
        Ok(summary)
    }

    /// Request cooperative cancellation.
    ///
    /// The status becomes `cancelled` immediately; no further rows are
    /// dispatched. Has no effect on a completed or failed run.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Current status.
    pub fn status(&self) -> BatchStatus {
        self.shared.state.lock().run.status()
    }

    /// Aggregate counts over results recorded so far.
    pub fn stats(&self) -> BatchStats {
        self.shared.state.lock().run.stats()
    }

    /// Recorded results in row-index order.
    pub fn results(&self) -> Vec<RowResult> {
        self.shared.state.lock().run.results()
    }

    /// A copy of the current run.
    pub fn run(&self) -> BatchRun {
        self.shared.state.lock().run.clone()
    }

    /// Progress of the current run.
    pub fn progress(&self) -> ProgressSnapshot {
        self.shared.state.lock().snapshot()
    }
}
