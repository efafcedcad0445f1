//! Tests for layered configuration loading.

use rowsmith_core::BatchConfig;
use rowsmith_error::ConfigErrorKind;
use rowsmith_rate_limit::RowsmithConfig;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_bundled_defaults_match_batch_defaults() {
    let config = RowsmithConfig::bundled().unwrap();
    assert_eq!(config.batch, BatchConfig::default());
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn test_from_file_overrides_only_given_fields() {
    let file = write_config(
        r#"
[batch]
max_retries = 5
rate_limit_max = 10

[logging]
json = true
"#,
    );

    let config = RowsmithConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.batch.max_retries(), 5);
    assert_eq!(*config.batch.rate_limit_max(), 10);
    assert_eq!(*config.batch.circuit_threshold(), 5);
    assert!(config.logging.json);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let file = write_config("[batch]\nbackoff_multiplier = 0.5\n");

    let err = RowsmithConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err.kind(), ConfigErrorKind::InvalidField { field, .. } if field == "backoff_multiplier"));
}

#[test]
fn test_from_file_rejects_unknown_batch_fields() {
    let file = write_config("[batch]\nmax_retry = 5\n");

    let err = RowsmithConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err.kind(), ConfigErrorKind::Parse(_)));
}

#[test]
fn test_from_file_missing_file_fails_to_load() {
    let err = RowsmithConfig::from_file("/nonexistent/rowsmith.toml").unwrap_err();
    assert!(matches!(err.kind(), ConfigErrorKind::Load(_)));
}
