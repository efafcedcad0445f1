//! Batch execution configuration.

use rowsmith_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on retries; beyond this the backoff cap dominates anyway.
const MAX_RETRIES_LIMIT: u32 = 20;

/// Tuning knobs for one batch run.
///
/// Every field has a default, so a partially written TOML table or an empty
/// builder yields a usable configuration. Durations are stored in milliseconds
/// to keep the file format flat; use the `Duration` accessors in code.
///
/// # Examples
///
/// ```
/// use rowsmith_core::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .max_retries(5)
///     .row_timeout_ms(10_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(*config.max_retries(), 5);
/// assert_eq!(*config.rate_limit_max(), 60); // Default
/// assert!(config.validate().is_ok());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[serde(default, deny_unknown_fields)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct BatchConfig {
    /// Retries after the first attempt for transient failures.
    max_retries: u32,

    /// Backoff ceiling for the first retry, in milliseconds.
    initial_delay_ms: u64,

    /// Growth factor applied per retry.
    backoff_multiplier: f64,

    /// Hard cap on a single backoff, in milliseconds.
    max_delay_ms: u64,

    /// Rate limiter window length, in milliseconds.
    rate_limit_window_ms: u64,

    /// Permits granted per rate limiter window.
    rate_limit_max: u32,

    /// Consecutive failures that open the circuit.
    circuit_threshold: u32,

    /// Time the circuit stays open before probing, in milliseconds.
    circuit_cooldown_ms: u64,

    /// Half-open successes required to close the circuit.
    circuit_required_successes: u32,

    /// Deadline for a single generation attempt, in milliseconds.
    row_timeout_ms: u64,

    /// Rows executed at once. 1 means strictly sequential.
    concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30_000,
            rate_limit_window_ms: 60_000,
            rate_limit_max: 60,
            circuit_threshold: 5,
            circuit_cooldown_ms: 60_000,
            circuit_required_successes: 2,
            row_timeout_ms: 30_000,
            concurrency: 1,
        }
    }
}

impl BatchConfig {
    /// Creates a new batch config builder.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }

    /// Validates ranges and cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::invalid_field(
                "max_retries",
                format!("must be at most {}, got {}", MAX_RETRIES_LIMIT, self.max_retries),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::invalid_field(
                "backoff_multiplier",
                format!("must be a finite value >= 1.0, got {}", self.backoff_multiplier),
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ConfigError::invalid_field(
                "initial_delay_ms",
                format!(
                    "must not exceed max_delay_ms ({}), got {}",
                    self.max_delay_ms, self.initial_delay_ms
                ),
            ));
        }
        for (field, value) in [
            ("rate_limit_window_ms", self.rate_limit_window_ms),
            ("circuit_cooldown_ms", self.circuit_cooldown_ms),
            ("row_timeout_ms", self.row_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid_field(field, "must be positive"));
            }
        }
        for (field, value) in [
            ("rate_limit_max", self.rate_limit_max),
            ("circuit_threshold", self.circuit_threshold),
            ("circuit_required_successes", self.circuit_required_successes),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid_field(field, "must be positive"));
            }
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid_field("concurrency", "must be at least 1"));
        }
        Ok(())
    }

    /// Initial backoff as a `Duration`.
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Backoff cap as a `Duration`.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Rate limiter window as a `Duration`.
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    /// Circuit cooldown as a `Duration`.
    pub fn circuit_cooldown(&self) -> Duration {
        Duration::from_millis(self.circuit_cooldown_ms)
    }

    /// Per-attempt deadline as a `Duration`.
    pub fn row_timeout(&self) -> Duration {
        Duration::from_millis(self.row_timeout_ms)
    }
}

impl BatchConfigBuilder {
    /// Builds and validates in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder fails or validation rejects a field.
    pub fn build_validated(&self) -> Result<BatchConfig, ConfigError> {
        let config = self
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Builder(e.to_string())))?;
        config.validate()?;
        Ok(config)
    }
}
