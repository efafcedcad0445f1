//! Configuration display command handler.

use rowsmith::{ConfigError, ConfigErrorKind, RowsmithConfig, RowsmithResult};

/// Print the effective configuration as TOML.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn show_config(config: &RowsmithConfig) -> RowsmithResult<()> {
    let text = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;
    print!("{text}");
    Ok(())
}
