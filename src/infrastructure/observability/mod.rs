//! Observability infrastructure - Metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_analytics_computation, record_http_request,
    record_prediction, PredictionMode, PrometheusMetrics,
};
