//! Three-state circuit breaker.
//!
//! # State Transitions
//!
//! ```text
//! Closed ──failures >= threshold──> Open
//! Open ──cooldown elapsed, next call──> HalfOpen
//! HalfOpen ──success (count < required)──> HalfOpen
//! HalfOpen ──success (count >= required)──> Closed
//! HalfOpen ──any failure──> Open (cooldown restarts)
//! ```
//!
//! Open fails fast without invoking the wrapped operation. HalfOpen admits one
//! probe at a time; concurrent callers are refused until the probe settles.

use parking_lot::Mutex;
use rowsmith_core::BatchConfig;
use rowsmith_error::{BatchError, BatchErrorKind};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls fail fast.
    Open,
    /// Probes test whether the dependency recovered.
    HalfOpen,
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitSnapshot {
    /// Current state.
    pub state: CircuitState,
    /// Consecutive failures while closed.
    pub failure_count: u32,
    /// Successful probes while half-open.
    pub success_count: u32,
    /// When the circuit last opened.
    pub last_failure_at: Option<Instant>,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Circuit breaker shared across row executions.
///
/// Every failure of the wrapped operation counts toward the threshold; a
/// success while closed resets the count.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    required_successes: u32,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(threshold: u32, cooldown: Duration, required_successes: u32) -> Self {
        Self {
            threshold,
            cooldown,
            required_successes,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Create a breaker from the batch configuration.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(
            *config.circuit_threshold(),
            config.circuit_cooldown(),
            *config.circuit_required_successes(),
        )
    }

    /// Current state without triggering the lazy open → half-open move.
    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.inner.lock();
        CircuitSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            last_failure_at: inner.last_failure_at,
        }
    }

    /// Current state.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Force the breaker closed and clear its counters.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.last_failure_at = None;
        inner.probe_in_flight = false;
    }

    /// Run `operation` through the breaker.
    ///
    /// # Errors
    ///
    /// Returns `CircuitOpen` without invoking `operation` while the circuit is
    /// open or a half-open probe is already in flight. Otherwise returns the
    /// operation's own error.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, BatchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BatchError>>,
    {
        let probe = self.admit()?;
        let mut guard = ProbeGuard {
            breaker: self,
            armed: probe,
        };

        let result = operation().await;
        guard.armed = false;

        match &result {
            Ok(_) => self.on_success(),
            Err(_) => self.on_failure(),
        }
        result
    }

    /// Decide whether a call may proceed. Returns true if the call is a half-open probe.
    #[track_caller]
    fn admit(&self) -> Result<bool, BatchError> {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        match inner.state {
            CircuitState::Closed => Ok(false),
            CircuitState::Open => {
                let opened = inner.last_failure_at.unwrap_or(now);
                let elapsed = now.duration_since(opened);
                if elapsed > self.cooldown {
                    debug!("Cooldown elapsed, circuit half-open");
                    inner.state = CircuitState::HalfOpen;
                    inner.success_count = 0;
                    inner.probe_in_flight = true;
                    Ok(true)
                } else {
                    Err(BatchError::new(BatchErrorKind::CircuitOpen {
                        retry_in_ms: (self.cooldown - elapsed).as_millis() as u64,
                    }))
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(BatchError::new(BatchErrorKind::CircuitOpen { retry_in_ms: 0 }))
                } else {
                    inner.probe_in_flight = true;
                    Ok(true)
                }
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.probe_in_flight = false;
                inner.success_count += 1;
                if inner.success_count >= self.required_successes {
                    info!(successes = inner.success_count, "Circuit closed");
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                }
            }
            // A call admitted before the circuit opened; the open timer stands.
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.threshold {
                    warn!(failures = inner.failure_count, "Circuit opened");
                    inner.state = CircuitState::Open;
                    inner.last_failure_at = Some(now);
                }
            }
            CircuitState::HalfOpen => {
                warn!("Half-open probe failed, circuit reopened");
                inner.state = CircuitState::Open;
                inner.last_failure_at = Some(now);
                inner.success_count = 0;
                inner.probe_in_flight = false;
            }
            CircuitState::Open => {}
        }
    }
}

/// Releases the half-open probe slot if the probe future is dropped mid-flight.
struct ProbeGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.inner.lock().probe_in_flight = false;
        }
    }
}
