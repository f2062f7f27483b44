//! Stability gate: judge score spread across a reliability run

use serde::Deserialize;
use std::path::Path;

use crate::errors::Result;
use crate::eval::io::read_json;
use crate::gates::GateReport;

/// The one field of a reliability summary this gate reads
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StabilityInput {
    pub overall_std: f64,
}

/// Fails when `overall_std` exceeds `max_std`
pub fn evaluate(input: StabilityInput, max_std: f64) -> GateReport {
    GateReport {
        gate: "stability",
        statistic: input.overall_std,
        threshold: max_std,
        passed: input.overall_std <= max_std,
        lines: vec![format!(
            "Overall std: {:.3} (max allowed: {:.3})",
            input.overall_std, max_std
        )],
    }
}

pub fn run(summary: &Path, max_std: f64) -> Result<GateReport> {
    let input: StabilityInput = read_json(summary)?;
    Ok(evaluate(input, max_std))
}
