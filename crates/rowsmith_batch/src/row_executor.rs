//! Execution of a single row against a generator.

use crate::{Generator, render_template};
use rowsmith_core::BatchConfig;
use rowsmith_error::{BatchError, BatchErrorKind};
use rowsmith_rate_limit::{
    CircuitBreaker, DefaultClassifier, ErrorClassifier, RateLimiter, RetryPolicy,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Text produced for a row, plus the retries it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutput {
    /// Generated text, never blank.
    pub text: String,
    /// Retries consumed beyond the first attempt.
    pub retries: u32,
}

/// Runs one row through rate limiting, retry, circuit breaking and a per-attempt timeout.
///
/// The layers nest as `retry(breaker(timeout(generate)))`: every attempt gets a
/// fresh timeout window and is counted by the breaker, and a `CircuitOpen`
/// rejection ends the retry loop. One rate-limit permit is taken per row before
/// the first attempt.
///
/// The limiter and breaker are shared handles, so several executors (or
/// several batches) can draw from the same budget.
#[derive(Clone)]
pub struct RowExecutor {
    limiter: Arc<RateLimiter>,
    breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
    row_timeout: Duration,
    classifier: Arc<dyn ErrorClassifier>,
    mapper: DefaultClassifier,
}

impl std::fmt::Debug for RowExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowExecutor")
            .field("limiter", &self.limiter)
            .field("breaker", &self.breaker)
            .field("policy", &self.policy)
            .field("row_timeout", &self.row_timeout)
            .finish_non_exhaustive()
    }
}

impl RowExecutor {
    /// Build an executor with its own limiter and breaker.
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::from_config(config)),
            breaker: Arc::new(CircuitBreaker::from_config(config)),
            policy: RetryPolicy::from_config(config),
            row_timeout: config.row_timeout(),
            classifier: Arc::new(DefaultClassifier::new()),
            mapper: DefaultClassifier::new(),
        }
    }

    /// Draw permits from a shared limiter.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Report outcomes to a shared breaker.
    pub fn with_circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = breaker;
        self
    }

    /// Replace the retry decision.
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// The limiter in use.
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// The breaker in use.
    pub fn circuit_breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Per-attempt deadline.
    pub fn row_timeout(&self) -> Duration {
        self.row_timeout
    }

    /// Render `template` with `input` and generate text for it.
    ///
    /// # Errors
    ///
    /// - `RateLimitExceeded` if no permit is left; the generator is not called
    /// - `CircuitOpen` if the breaker refuses the call
    /// - `Timeout`, `EmptyResponse` or `TransientService` once retries are exhausted
    /// - `PermanentService` on the first non-retryable generator failure
    #[instrument(skip(self, template, input, generator), fields(columns = input.len()))]
    pub async fn execute_row<G>(
        &self,
        template: &str,
        input: &HashMap<String, String>,
        generator: &G,
    ) -> Result<RowOutput, BatchError>
    where
        G: Generator + ?Sized,
    {
        let prompt = render_template(template, input);
        self.limiter.acquire()?;

        let outcome = self
            .policy
            .run(self.classifier.as_ref(), || self.attempt(&prompt, generator))
            .await?;

        debug!(retries = outcome.retries, "Row generated");
        Ok(RowOutput {
            text: outcome.value,
            retries: outcome.retries,
        })
    }

    async fn attempt<G>(&self, prompt: &str, generator: &G) -> Result<String, BatchError>
    where
        G: Generator + ?Sized,
    {
        self.breaker
            .execute(|| async {
                let text = match tokio::time::timeout(self.row_timeout, generator.generate(prompt))
                    .await
                {
                    Err(_) => {
                        return Err(BatchError::new(BatchErrorKind::Timeout {
                            timeout_ms: self.row_timeout.as_millis() as u64,
                        }));
                    }
                    Ok(Err(e)) => return Err(self.mapper.classify(&e)),
                    Ok(Ok(text)) => text,
                };
                if text.trim().is_empty() {
                    Err(BatchError::new(BatchErrorKind::EmptyResponse))
                } else {
                    Ok(text)
                }
            })
            .await
    }
}
