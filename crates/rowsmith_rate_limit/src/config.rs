//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. Bundled defaults (`include_str!` of `rowsmith.toml`)
//! 2. `~/.config/rowsmith/rowsmith.toml`
//! 3. `./rowsmith.toml`
//! 4. `ROWSMITH_*` environment variables, `__` separating sections
//!    (`ROWSMITH_BATCH__MAX_RETRIES=5`)
//!
//! User files are optional and silently skipped when absent.

use config::{Config, Environment, File, FileFormat};
use rowsmith_core::BatchConfig;
use rowsmith_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Bundled default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../../../rowsmith.toml");

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level Rowsmith configuration.
///
/// # Example
///
/// ```no_run
/// use rowsmith_rate_limit::RowsmithConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RowsmithConfig::load()?;
/// println!("max retries: {}", config.batch.max_retries());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RowsmithConfig {
    /// Execution parameters for batches
    pub batch: BatchConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

impl RowsmithConfig {
    /// Load configuration from a single file.
    ///
    /// Fields missing from the file take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or holds
    /// out-of-range batch settings.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading configuration from file");

        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Load(format!(
                    "{}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?;
        Self::finish(settings)
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a present source is unreadable, the merged result
    /// does not parse, or the batch settings are out of range.
    #[instrument]
    pub fn load() -> Result<Self, ConfigError> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/rowsmith/rowsmith.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("rowsmith").required(false))
            .add_source(
                Environment::with_prefix("ROWSMITH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?;
        Self::finish(settings)
    }

    /// Parse the bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled file is malformed.
    pub fn bundled() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, ConfigError> {
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;
        config.batch.validate()?;
        debug!(batch = ?config.batch, "Configuration loaded");
        Ok(config)
    }
}
