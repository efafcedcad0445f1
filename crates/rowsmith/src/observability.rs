//! Tracing subscriber setup.
//!
//! Logs go to stderr through `tracing-subscriber`, as text or JSON lines. With
//! the `observability` feature, spans are also bridged to OpenTelemetry and
//! exported to stdout.

use rowsmith_rate_limit::LoggingConfig;
use std::env;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for log and span output.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for telemetry attribution
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Log level filter (e.g., "info", "rowsmith_batch=debug")
    pub log_level: String,
    /// Enable JSON-formatted logs for structured logging
    pub json_logs: bool,
}

impl ObservabilityConfig {
    /// Create a new configuration with the given service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            json_logs: false,
        }
    }

    /// Take level and format from the `[logging]` configuration section.
    pub fn from_logging(service_name: impl Into<String>, logging: &LoggingConfig) -> Self {
        Self::new(service_name)
            .with_log_level(logging.level.clone())
            .with_json_logs(logging.json)
    }

    /// Set the service version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// The filter to install: `RUST_LOG` if set, otherwise the configured level.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured level is not a valid filter directive.
    pub fn env_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
        Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.log_level))?)
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

/// Initialize logging with default configuration.
///
/// # Errors
///
/// Returns an error if the log filter is invalid or a global subscriber is
/// already installed.
pub fn init_observability() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_observability_with_config(ObservabilityConfig::default())
}

/// Initialize logging with custom configuration.
///
/// This sets up:
/// - An environment filter (`RUST_LOG` wins over the configured level)
/// - A text or JSON fmt layer on stderr
/// - With the `observability` feature, an OpenTelemetry layer exporting spans to stdout
///
/// # Errors
///
/// Returns an error if the log filter is invalid or a global subscriber is
/// already installed.
pub fn init_observability_with_config(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = config.env_filter()?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    #[cfg(feature = "observability")]
    let registry = registry.with(otel::layer(&config));

    registry.try_init()?;
    Ok(())
}

/// Flush and release telemetry resources.
///
/// Span providers flush when dropped, so with the stdout exporter this only
/// needs to run before process exit.
pub fn shutdown_observability() {
    tracing::debug!("Observability shut down");
}

#[cfg(feature = "observability")]
mod otel {
    use super::ObservabilityConfig;
    use opentelemetry::{KeyValue, global, trace::TracerProvider};
    use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
    use opentelemetry_stdout::SpanExporter;

    pub(super) fn layer<S>(
        config: &ObservabilityConfig,
    ) -> impl tracing_subscriber::Layer<S>
    where
        S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
    {
        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .with_attributes(vec![KeyValue::new(
                "service.version",
                config.service_version.clone(),
            )])
            .build();

        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(SpanExporter::default())
            .with_resource(resource)
            .build();

        global::set_tracer_provider(provider.clone());

        let tracer = provider.tracer(config.service_name.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    }
}
