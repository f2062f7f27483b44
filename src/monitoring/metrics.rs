//! Per-request inference metrics
//!
//! One `InferenceMetric` per live answer, written as one JSON line to
//! stdout, an append-only file, or both. The raw question is never stored,
//! only its length and a SHA-256 digest.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{EvalError, Result};
use crate::eval::io::read_jsonl;
use crate::eval::stats;

pub const DEFAULT_METRICS_FILE: &str = "metrics.jsonl";
pub const DEFAULT_SOURCE: &str = "rag";

/// A single observation of one live answer request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceMetric {
    pub timestamp: String,
    pub request_id: String,
    pub question_len: usize,
    pub question_sha256: String,
    pub top_k: usize,
    pub num_chunks: usize,
    pub mean_distance: Option<f64>,
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub cited: bool,
    pub refusal: bool,
    pub latency_ms: u64,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub collection: String,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Inputs for `make_metric`
#[derive(Debug, Clone, Default)]
pub struct MetricInput<'a> {
    pub request_id: &'a str,
    pub question: &'a str,
    pub top_k: usize,
    pub distances: &'a [f64],
    pub cited: bool,
    pub refusal: bool,
    pub latency_ms: u64,
    /// Defaults to `"rag"` when `None`
    pub source: Option<&'a str>,
    pub model: &'a str,
    pub collection: &'a str,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Hex SHA-256 of a question
pub fn question_digest(question: &str) -> String {
    let digest = Sha256::digest(question.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Build a metric record; the only impure part is the timestamp
pub fn make_metric(input: MetricInput<'_>) -> InferenceMetric {
    let mut sorted = input.distances.to_vec();
    sorted.sort_by(f64::total_cmp);

    InferenceMetric {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        request_id: input.request_id.to_string(),
        question_len: input.question.chars().count(),
        question_sha256: question_digest(input.question),
        top_k: input.top_k,
        num_chunks: sorted.len(),
        mean_distance: stats::mean(&sorted),
        min_distance: sorted.first().copied(),
        max_distance: sorted.last().copied(),
        cited: input.cited,
        refusal: input.refusal,
        latency_ms: input.latency_ms,
        source: input.source.unwrap_or(DEFAULT_SOURCE).to_string(),
        model: input.model.to_string(),
        collection: input.collection.to_string(),
        extra: input.extra,
    }
}

/// Where metric lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsSink {
    Stdout,
    File,
    Both,
}

impl MetricsSink {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "file" => Ok(Self::File),
            "both" => Ok(Self::Both),
            other => Err(EvalError::ConfigError(format!(
                "METRICS_SINK must be stdout, file or both (got '{}')",
                other
            ))),
        }
    }

    fn to_stdout(self) -> bool {
        matches!(self, Self::Stdout | Self::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, Self::File | Self::Both)
    }
}

/// Metrics destination, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    pub sink: MetricsSink,
    pub file: PathBuf,
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            sink: MetricsSink::Stdout,
            file: PathBuf::from(DEFAULT_METRICS_FILE),
            enabled: true,
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_SINK`, `METRICS_FILE` and `METRICS_ENABLED`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sink = match lookup("METRICS_SINK") {
            Some(value) => MetricsSink::parse(&value)?,
            None => MetricsSink::Stdout,
        };
        let file = lookup("METRICS_FILE")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METRICS_FILE));
        let enabled = lookup("METRICS_ENABLED")
            .map(|value| value == "1")
            .unwrap_or(true);

        Ok(Self {
            sink,
            file,
            enabled,
        })
    }
}

/// Writes one JSON line per metric, unbuffered
pub struct MetricsLogger {
    config: MetricsConfig,
}

impl MetricsLogger {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// No-op when disabled
    ///
    /// The file path opens in append mode and receives the whole line in a
    /// single write, so concurrent loggers never interleave partial lines.
    pub fn log(&self, metric: &InferenceMetric) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let mut line = serde_json::to_string(metric)?;
        line.push('\n');

        if self.config.sink.to_stdout() {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(line.as_bytes())?;
            stdout.flush()?;
        }

        if self.config.sink.to_file() {
            append_line(&self.config.file, &line)?;
        }

        Ok(())
    }
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Read a metrics log; an empty log is an error
pub fn read_metrics_log(path: &Path) -> Result<Vec<InferenceMetric>> {
    read_jsonl(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_make_metric_hides_question() {
        let metric = make_metric(MetricInput {
            request_id: "req-1",
            question: "What is Article 5?",
            top_k: 4,
            distances: &[0.4, 0.2, 0.3],
            cited: true,
            ..Default::default()
        });

        assert_eq!(metric.question_len, 18);
        assert_eq!(metric.question_sha256.len(), 64);
        assert_eq!(metric.num_chunks, 3);
        assert_eq!(metric.min_distance, Some(0.2));
        assert_eq!(metric.max_distance, Some(0.4));
        assert!((metric.mean_distance.unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(metric.source, "rag");

        let line = serde_json::to_string(&metric).unwrap();
        assert!(!line.contains("Article 5"));
    }

    #[test]
    fn test_make_metric_without_chunks() {
        let metric = make_metric(MetricInput {
            request_id: "req-2",
            question: "",
            ..Default::default()
        });
        assert_eq!(metric.num_chunks, 0);
        assert_eq!(metric.mean_distance, None);
        assert_eq!(metric.min_distance, None);
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        assert_eq!(
            question_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = MetricsConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, MetricsConfig::default());
    }

    #[test]
    fn test_config_from_vars() {
        let config = MetricsConfig::from_vars(vars(&[
            ("METRICS_SINK", "BOTH"),
            ("METRICS_FILE", "/tmp/m.jsonl"),
            ("METRICS_ENABLED", "0"),
        ]))
        .unwrap();
        assert_eq!(config.sink, MetricsSink::Both);
        assert_eq!(config.file, PathBuf::from("/tmp/m.jsonl"));
        assert!(!config.enabled);
    }

    #[test]
    fn test_unknown_sink_is_error() {
        let err = MetricsConfig::from_vars(vars(&[("METRICS_SINK", "kafka")])).unwrap_err();
        assert!(matches!(err, EvalError::ConfigError(_)));
    }

    #[test]
    fn test_file_sink_appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("metrics.jsonl");
        let logger = MetricsLogger::new(MetricsConfig {
            sink: MetricsSink::File,
            file: path.clone(),
            enabled: true,
        });

        let metric = make_metric(MetricInput {
            request_id: "a",
            question: "q",
            ..Default::default()
        });
        logger.log(&metric).unwrap();
        logger.log(&metric).unwrap();

        let rows = read_metrics_log(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], metric);
    }
}
