//! Tests for observability configuration.

use rowsmith::{LoggingConfig, ObservabilityConfig};

#[test]
fn test_from_logging_copies_level_and_format() {
    let logging = LoggingConfig {
        level: "rowsmith_batch=debug".to_string(),
        json: true,
    };

    let config = ObservabilityConfig::from_logging("rowsmith-test", &logging);
    assert_eq!(config.service_name, "rowsmith-test");
    assert_eq!(config.log_level, "rowsmith_batch=debug");
    assert!(config.json_logs);
}

#[test]
fn test_builder_methods() {
    let config = ObservabilityConfig::new("svc")
        .with_version("9.9.9")
        .with_log_level("warn")
        .with_json_logs(false);

    assert_eq!(config.service_version, "9.9.9");
    assert_eq!(config.log_level, "warn");
    assert!(!config.json_logs);
}

#[test]
fn test_init_installs_subscriber_once() {
    let config = ObservabilityConfig::new("rowsmith-test").with_log_level("warn");
    assert!(rowsmith::init_observability_with_config(config.clone()).is_ok());
    // A second global subscriber is refused rather than panicking
    assert!(rowsmith::init_observability_with_config(config).is_err());
    rowsmith::shutdown_observability();
}
