//! Refusal gate: on an unanswerable suite, most answers must refuse

use std::path::Path;

use crate::errors::{EvalError, Result};
use crate::gates::{load_results, AnswerClassifier, GateReport, ResultRow};

/// Fails when the refusal fraction is below `min_refusal_rate`
pub fn evaluate(
    rows: &[ResultRow],
    classifier: &AnswerClassifier,
    min_refusal_rate: f64,
) -> Result<GateReport> {
    if rows.is_empty() {
        return Err(EvalError::EmptyInput("results".to_string()));
    }

    let total = rows.len();
    let refused = rows
        .iter()
        .filter(|row| classifier.is_refusal(row.answer()))
        .count();
    let rate = refused as f64 / total as f64;

    Ok(GateReport {
        gate: "refusal",
        statistic: rate,
        threshold: min_refusal_rate,
        passed: rate >= min_refusal_rate,
        lines: vec![
            format!("Total: {}", total),
            format!("Refusals: {}", refused),
            format!(
                "Refusal rate: {:.3} (min required: {:.3})",
                rate, min_refusal_rate
            ),
        ],
    })
}

pub fn run(results: &Path, min_refusal_rate: f64) -> Result<GateReport> {
    let classifier = AnswerClassifier::new()?;
    evaluate(&load_results(results)?, &classifier, min_refusal_rate)
}
