//! Live-inference monitoring: metric records, period summaries, drift and alerts

pub mod alerts;
pub mod drift;
pub mod metrics;

use serde::{Deserialize, Serialize};

use crate::errors::{EvalError, Result};
use crate::eval::stats;

pub use alerts::check_alerts;
pub use drift::{compute_drift_score, load_baseline, Baseline, DriftScore};
pub use metrics::{
    make_metric, read_metrics_log, InferenceMetric, MetricInput, MetricsConfig, MetricsLogger,
    MetricsSink,
};

/// Aggregate view of a period of metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub count: usize,
    pub refusal_rate: f64,
    pub cited_rate: f64,
    pub question_len_mean: f64,
    /// Mean of per-request mean distances; `None` when no request retrieved anything
    pub mean_distance: Option<f64>,
    pub latency_ms_mean: f64,
}

impl MetricsSummary {
    /// Baseline-shaped view for drift comparison
    pub fn as_baseline(&self) -> Option<Baseline> {
        self.mean_distance.map(|mean_distance_mean| Baseline {
            question_len_mean: self.question_len_mean,
            mean_distance_mean,
        })
    }
}

pub fn summarize_metrics(metrics: &[InferenceMetric]) -> Result<MetricsSummary> {
    if metrics.is_empty() {
        return Err(EvalError::EmptyInput("metrics".to_string()));
    }

    let count = metrics.len();
    let fraction = |pred: fn(&InferenceMetric) -> bool| {
        metrics.iter().filter(|m| pred(m)).count() as f64 / count as f64
    };
    let question_lens: Vec<f64> = metrics.iter().map(|m| m.question_len as f64).collect();
    let distances: Vec<f64> = metrics.iter().filter_map(|m| m.mean_distance).collect();
    let latencies: Vec<f64> = metrics.iter().map(|m| m.latency_ms as f64).collect();

    Ok(MetricsSummary {
        count,
        refusal_rate: fraction(|m| m.refusal),
        cited_rate: fraction(|m| m.cited),
        question_len_mean: stats::mean(&question_lens).unwrap_or(0.0),
        mean_distance: stats::mean(&distances),
        latency_ms_mean: stats::mean(&latencies).unwrap_or(0.0),
    })
}
