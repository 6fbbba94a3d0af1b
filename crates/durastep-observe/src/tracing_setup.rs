//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! The engine itself only emits `tracing` events (step skip/run/commit at
//! debug, run outcomes at info/error); this module is where a host process
//! decides what to do with them.
//!
//! # Usage
//!
//! ```no_run
//! // Respect RUST_LOG, structured logging only
//! durastep_observe::tracing_setup::init_tracing(false).unwrap();
//!
//! // Explicit filter (e.g. derived from CLI verbosity flags), with
//! // OpenTelemetry export to stdout for local development
//! durastep_observe::tracing_setup::init_with_filter("info,durastep=debug", true).unwrap();
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::OnceLock;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Initialize the global subscriber, honoring `RUST_LOG`.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if the
/// OTel pipeline fails to initialize.
pub fn init_tracing(enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    init(EnvFilter::from_default_env(), enable_otel)
}

/// Initialize the global subscriber with an explicit filter directive,
/// e.g. one derived from CLI `--verbose`/`--quiet` flags.
pub fn init_with_filter(filter: &str, enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    init(EnvFilter::new(filter), enable_otel)
}

fn init(env_filter: EnvFilter, enable_otel: bool) -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    if enable_otel {
        // Stdout exporter is for local development; swap for OTLP in
        // production deployments.
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("durastep");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        // Store the provider for shutdown and register it globally.
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
