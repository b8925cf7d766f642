//! Structured logging with optional OTLP span export

use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, Tracer, TracerProvider},
    Resource,
};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use super::config::TracingConfig;
use crate::config::LogFormat;
use crate::infrastructure::logging::LoggingConfig;

/// Install the global subscriber
///
/// `RUST_LOG` overrides the configured level. An OTLP exporter that fails to
/// build is reported once logging is up and the service runs without it.
pub fn init_tracing(logging_config: &LoggingConfig, tracing_config: &TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging_config.level));

    let (tracer, otel_error) = if tracing_config.enabled {
        match otlp_tracer(tracing_config) {
            Ok(tracer) => (Some(tracer), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };
    let exporting = tracer.is_some();

    match logging_config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t)))
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_span_events(FmtSpan::CLOSE))
            .with(tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t)))
            .init(),
    }

    if let Some(e) = otel_error {
        tracing::warn!(error = %e, "OTLP exporter unavailable; spans are not exported");
    } else if exporting {
        tracing::info!(endpoint = %tracing_config.otlp_endpoint, "Exporting spans over OTLP");
    }
}

fn otlp_tracer(config: &TracingConfig) -> Result<Tracer, opentelemetry::trace::TraceError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_sampler(sampler_for(config.sampling_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]))
        .with_batch_exporter(exporter, runtime::Tokio)
        .build();

    let tracer = provider.tracer(config.service_name.clone());
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracer)
}

fn sampler_for(ratio: f64) -> Sampler {
    if ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(ratio)
    }
}

/// Flush pending spans before exit
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}
