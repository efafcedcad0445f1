//! Fixed-window request limiter.
//!
//! The limiter never blocks or queues: a denied permit is reported immediately
//! and the caller fails the request with `RateLimitExceeded`. Backpressure is
//! the caller's responsibility.

use parking_lot::Mutex;
use rowsmith_core::BatchConfig;
use rowsmith_error::{BatchError, BatchErrorKind};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Request counter for the current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    count: u32,
}

impl Window {
    fn fresh() -> Self {
        Self {
            start: Instant::now(),
            count: 0,
        }
    }
}

/// Fixed-window rate limiter shared across row executions.
///
/// The window resets lazily: the first request arriving strictly after
/// `window` has elapsed since the window started opens a new window.
///
/// # Example
///
/// ```
/// use rowsmith_rate_limit::RateLimiter;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(60));
/// assert!(limiter.try_acquire());
/// assert!(limiter.try_acquire());
/// assert!(!limiter.try_acquire());
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimiter {
    /// Create a limiter granting `max_per_window` permits per `window`.
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        debug!(max_per_window, window_ms = window.as_millis() as u64, "Creating rate limiter");
        Self {
            max_per_window,
            window,
            state: Mutex::new(Window::fresh()),
        }
    }

    /// Create a limiter from the batch configuration.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(*config.rate_limit_max(), config.rate_limit_window())
    }

    /// Permits granted per window.
    pub fn max_per_window(&self) -> u32 {
        self.max_per_window
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Take a permit if one is left in the current window.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        let now = Instant::now();
        if now.duration_since(state.start) > self.window {
            debug!(previous_count = state.count, "Rate limit window reset");
            *state = Window {
                start: now,
                count: 0,
            };
        }
        if state.count >= self.max_per_window {
            return false;
        }
        state.count += 1;
        true
    }

    /// Take a permit or fail fast.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitExceeded` when the current window is exhausted.
    #[instrument(skip(self), fields(max = self.max_per_window))]
    pub fn acquire(&self) -> Result<(), BatchError> {
        if self.try_acquire() {
            Ok(())
        } else {
            debug!("Rate limit permit denied");
            Err(BatchError::new(BatchErrorKind::RateLimitExceeded {
                max: self.max_per_window,
                window_ms: self.window.as_millis() as u64,
            }))
        }
    }

    /// Permits left in the current window, accounting for an expired window.
    pub fn remaining(&self) -> u32 {
        let state = self.state.lock();
        if Instant::now().duration_since(state.start) > self.window {
            self.max_per_window
        } else {
            self.max_per_window.saturating_sub(state.count)
        }
    }

    /// Start a new, empty window now.
    pub fn reset(&self) {
        *self.state.lock() = Window::fresh();
    }
}
