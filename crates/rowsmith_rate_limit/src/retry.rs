//! Exponential backoff with full jitter.
//!
//! The delay before retry `n` (0-based) is drawn uniformly from
//! `[0, min(max_delay, initial_delay * multiplier^n))`. Randomizing the whole
//! interval keeps callers that failed together from retrying together.

use crate::ErrorClassifier;
use rowsmith_core::BatchConfig;
use rowsmith_error::BatchError;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::strategy::jitter_range;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Value produced by a retried operation, plus the retries it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    /// The successful result.
    pub value: T,
    /// Retries consumed beyond the first attempt.
    pub retries: u32,
}

/// Retry parameters for one operation.
///
/// # Example
///
/// ```rust,ignore
/// let policy = RetryPolicy::from_config(&config);
/// let outcome = policy
///     .run(&DefaultClassifier, || async { call_service().await })
///     .await?;
/// println!("succeeded after {} retries", outcome.retries);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        backoff_multiplier: f64,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_retries,
            initial_delay,
            backoff_multiplier,
            max_delay,
        }
    }

    /// Create a policy from the batch configuration.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(
            *config.max_retries(),
            config.initial_delay(),
            *config.backoff_multiplier(),
            config.max_delay(),
        )
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Upper bound of the jittered delay before retry `attempt` (0-based).
    ///
    /// Never exceeds `max_delay`. A multiplier that drives the product
    /// negative yields a zero ceiling.
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        if !scaled.is_finite() || scaled >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(scaled.max(0.0))
        }
    }

    /// Jittered delays actually slept, each drawn from `[0, ceiling)`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        self.schedule().map(jitter_range(0.0, 1.0))
    }

    /// Backoff ceilings for each permitted retry, before jitter.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule {
            policy: *self,
            attempt: 0,
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    ///
    /// Only failures the classifier marks as retryable are retried. The error
    /// returned on failure is the last one observed, tagged with the number of
    /// attempts made.
    ///
    /// # Errors
    ///
    /// Returns the final attempt's error.
    pub async fn run<T, F, Fut, C>(
        &self,
        classifier: &C,
        operation: F,
    ) -> Result<Retried<T>, BatchError>
    where
        C: ErrorClassifier + ?Sized,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, BatchError>> + Send,
        T: Send,
    {
        let attempts = AtomicU32::new(0);

        let outcome = Retry::spawn(self.delays(), || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            let call = operation();
            let attempts_left = attempt <= self.max_retries;
            async move {
                match call.await {
                    Ok(value) => Ok(value),
                    Err(e) if classifier.is_retryable(&e) => {
                        if attempts_left {
                            warn!(attempt, error = %e.kind(), "Transient error, will retry");
                        }
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        debug!(attempt, error = %e.kind(), "Permanent error, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await;

        let made = attempts.load(Ordering::SeqCst);
        match outcome {
            Ok(value) => Ok(Retried {
                value,
                retries: made.saturating_sub(1),
            }),
            Err(e) => Err(e.with_attempts(made)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&BatchConfig::default())
    }
}

/// Iterator of capped exponential delays, one per permitted retry.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    policy: RetryPolicy,
    attempt: u32,
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.attempt >= self.policy.max_retries {
            return None;
        }
        let delay = self.policy.backoff_ceiling(self.attempt);
        self.attempt += 1;
        Some(delay)
    }
}
