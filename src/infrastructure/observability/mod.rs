//! Observability infrastructure - Tracing and Metrics

mod config;
mod metrics;
mod tracing_setup;

pub use self::config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use self::metrics::{
    create_metrics_router, init_metrics, record_gate_redirect, record_http_request,
    PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
