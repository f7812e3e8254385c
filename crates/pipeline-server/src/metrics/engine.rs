//! Metric computation metrics.

use metrics::{counter, histogram};
use pipeline_core::MetricKind;
use std::time::Duration;

/// Resultado de una invocacion de `compute_metric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeOutcome {
    /// Servido desde cache.
    Cached,
    /// Calculado con un valor.
    Computed,
    /// Calculado pero suprimido (`value: null`).
    Unavailable,
    /// La fuente fallo.
    UpstreamError,
}

impl ComputeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Computed => "computed",
            Self::Unavailable => "unavailable",
            Self::UpstreamError => "upstream_error",
        }
    }
}

/// Registra las metricas del engine.
pub fn register_engine_metrics() {
    metrics::describe_counter!(
        "pipeline_metric_computations_total",
        "Metric requests by metric and outcome"
    );
    metrics::describe_histogram!(
        "pipeline_metric_compute_seconds",
        "Time spent deriving a metric on cache miss"
    );
}

/// Recorder de metricas del engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineMetrics;

impl EngineMetrics {
    pub fn record_outcome(&self, metric: MetricKind, outcome: ComputeOutcome) {
        counter!(
            "pipeline_metric_computations_total",
            "metric" => metric.as_str(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }

    pub fn record_compute_duration(&self, metric: MetricKind, duration: Duration) {
        histogram!("pipeline_metric_compute_seconds", "metric" => metric.as_str())
            .record(duration.as_secs_f64());
    }
}
