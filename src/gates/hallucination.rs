//! Hallucination gate: answers that neither refuse nor cite

use std::path::Path;

use crate::errors::{EvalError, Result};
use crate::gates::{load_results, AnswerClass, AnswerClassifier, GateReport, ResultRow};

/// Per-class counts; every row lands in exactly one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HallucinationTally {
    pub total: usize,
    pub refused: usize,
    pub cited: usize,
    pub hallucinated: usize,
}

impl HallucinationTally {
    pub fn count<'a, I>(answers: I, classifier: &AnswerClassifier) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tally = Self::default();
        for answer in answers {
            tally.total += 1;
            match classifier.classify(answer) {
                AnswerClass::Refusal => tally.refused += 1,
                AnswerClass::Cited => tally.cited += 1,
                AnswerClass::Hallucinated => tally.hallucinated += 1,
            }
        }
        tally
    }

    /// Hallucinated fraction; 0 for an empty tally
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.hallucinated as f64 / self.total as f64
    }
}

/// Fails when the hallucinated fraction exceeds `max_hallucination_rate`
pub fn evaluate(
    rows: &[ResultRow],
    classifier: &AnswerClassifier,
    max_hallucination_rate: f64,
) -> Result<GateReport> {
    if rows.is_empty() {
        return Err(EvalError::EmptyInput("results".to_string()));
    }

    let tally = HallucinationTally::count(rows.iter().map(ResultRow::answer), classifier);
    let rate = tally.rate();

    Ok(GateReport {
        gate: "hallucination",
        statistic: rate,
        threshold: max_hallucination_rate,
        passed: rate <= max_hallucination_rate,
        lines: vec![
            format!("Total: {}", tally.total),
            format!("Refusals: {}", tally.refused),
            format!("Cited non-refusals: {}", tally.cited),
            format!(
                "Hallucinations (no refusal + no citations): {}",
                tally.hallucinated
            ),
            format!(
                "Hallucination rate: {:.3} (max allowed: {:.3})",
                rate, max_hallucination_rate
            ),
        ],
    })
}

pub fn run(results: &Path, max_hallucination_rate: f64) -> Result<GateReport> {
    let classifier = AnswerClassifier::new()?;
    evaluate(&load_results(results)?, &classifier, max_hallucination_rate)
}
