//! Prometheus metrics
//!
//! Facade calls are no-ops until an exporter is installed.

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full Elo replay over the match history
    RatingReplay,
    /// Calibrated ensemble fit
    ModelFit,
    /// Single prediction request
    Prediction,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Teams with a rating after the last replay
    TeamsRated,
    /// Rows used by the last model fit
    TrainingSamples,
}

impl LatencyMetric {
    pub fn name(self) -> &'static str {
        match self {
            LatencyMetric::RatingReplay => "outcome_rating_replay_latency_ms",
            LatencyMetric::ModelFit => "outcome_model_fit_latency_ms",
            LatencyMetric::Prediction => "outcome_prediction_latency_ms",
        }
    }
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::TeamsRated => "outcome_teams_rated",
            GaugeMetric::TrainingSamples => "outcome_training_samples",
        }
    }
}

/// Counter for predictions served
pub const PREDICTIONS_SERVED: &str = "outcome_predictions_total";

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let value_ms = duration.as_secs_f64() * 1000.0;
    ::metrics::histogram!(metric.name()).record(value_ms);
    tracing::debug!(metric = metric.name(), value_ms, "Recording latency");
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
    tracing::debug!(metric = metric.name(), value = value, "Setting gauge");
}

/// Count one served prediction
pub fn record_prediction() {
    ::metrics::counter!(PREDICTIONS_SERVED).increment(1);
}
