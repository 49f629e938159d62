//! Tracing subscriber initialization for hosts embedding the bus.
//!
//! # Usage
//!
//! ```no_run
//! use topicbus_types::config::LoggingConfig;
//!
//! topicbus_observe::tracing_setup::init_tracing(&LoggingConfig::default()).unwrap();
//! // ... run the application ...
//! topicbus_observe::tracing_setup::shutdown_tracing();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use topicbus_types::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Kept so the OTel provider can be flushed on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Default directives when neither the config nor `RUST_LOG` set any.
const DEFAULT_FILTER: &str = "info";

/// Build the env filter: config directives first, then `RUST_LOG`, then
/// `info`.
///
/// # Errors
///
/// Returns an error if the configured directives do not parse.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ParseError> {
    match config.filter.as_deref() {
        Some(directives) => EnvFilter::try_new(directives),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global tracing subscriber.
///
/// - `LogFormat::Pretty`: human-readable fmt layer with targets and span
///   close timing.
/// - `LogFormat::Json`: one JSON object per line, including the current span.
/// - `otel_stdout`: also bridge spans to OpenTelemetry with a stdout
///   exporter.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = build_filter(config)?;

    let pretty_layer = (config.format == LogFormat::Pretty).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
    });
    let json_layer = (config.format == LogFormat::Json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
    });

    let otel_layer = config.otel_stdout.then(|| {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("topicbus");
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty_layer)
        .with(json_layer)
        .with(otel_layer)
        .try_init()?;

    tracing::debug!(
        format = ?config.format,
        otel_stdout = config.otel_stdout,
        "tracing initialized"
    );
    Ok(())
}

/// Flush pending spans and shut the OpenTelemetry provider down.
///
/// No-op when OTel was never enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
