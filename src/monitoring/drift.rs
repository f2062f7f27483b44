//! Drift against a stored baseline

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::Result;
use crate::eval::io::read_json;

pub const DEFAULT_BASELINE_PATH: &str = "monitoring/baseline.json";

/// Reference statistics; replaced as a whole, never edited in place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub question_len_mean: f64,
    pub mean_distance_mean: f64,
}

/// Absolute deltas between a current period and the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftScore {
    pub delta_question_len_mean: f64,
    pub delta_mean_distance_mean: f64,
}

/// `Ok(None)` when no baseline has been recorded yet
pub fn load_baseline(path: &Path) -> Result<Option<Baseline>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

pub fn compute_drift_score(current: &Baseline, baseline: &Baseline) -> DriftScore {
    DriftScore {
        delta_question_len_mean: (current.question_len_mean - baseline.question_len_mean).abs(),
        delta_mean_distance_mean: (current.mean_distance_mean - baseline.mean_distance_mean).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deltas_are_absolute() {
        let current = Baseline {
            question_len_mean: 40.0,
            mean_distance_mean: 0.30,
        };
        let baseline = Baseline {
            question_len_mean: 50.0,
            mean_distance_mean: 0.25,
        };
        let drift = compute_drift_score(&current, &baseline);
        assert_eq!(drift.delta_question_len_mean, 10.0);
        assert!((drift.delta_mean_distance_mean - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_missing_baseline_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_baseline(&dir.path().join("baseline.json")).unwrap(), None);
    }

    #[test]
    fn test_load_baseline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("baseline.json");
        std::fs::write(&path, r#"{"question_len_mean": 42.5, "mean_distance_mean": 0.31}"#).unwrap();
        let baseline = load_baseline(&path).unwrap().unwrap();
        assert_eq!(baseline.question_len_mean, 42.5);
    }
}
