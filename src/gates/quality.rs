//! Quality gate: mean overall score must reach a minimum

use std::path::Path;

use crate::errors::{EvalError, Result};
use crate::eval::stats;
use crate::gates::{load_results, GateReport, ResultRow};

/// Fails when the mean `scores.overall` is below `min_overall`
pub fn evaluate(rows: &[ResultRow], min_overall: f64) -> Result<GateReport> {
    let overalls = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            row.scores.as_ref().map(|s| s.overall).ok_or_else(|| {
                EvalError::DatasetError(format!("result row {} has no scores.overall", idx + 1))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    let mean_overall = stats::mean(&overalls)
        .ok_or_else(|| EvalError::EmptyInput("results".to_string()))?;

    Ok(GateReport {
        gate: "quality",
        statistic: mean_overall,
        threshold: min_overall,
        passed: mean_overall >= min_overall,
        lines: vec![format!(
            "Mean overall: {:.3} (min required: {:.3})",
            mean_overall, min_overall
        )],
    })
}

pub fn run(results: &Path, min_overall: f64) -> Result<GateReport> {
    evaluate(&load_results(results)?, min_overall)
}
