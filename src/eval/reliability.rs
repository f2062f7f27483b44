//! Judge reliability: repeated scoring of fixed inputs

use std::path::Path;
use tracing::info;

use crate::dataset::DatasetExample;
use crate::errors::{EvalError, Result};
use crate::eval::io::write_json_pretty;
use crate::eval::record::{PerExampleReliability, ReliabilitySummary};
use crate::eval::stats;
use crate::judge::{Judge, JudgeInput};

pub const DEFAULT_RUNS: usize = 5;

/// Temperature for every repeated judge call
pub const RELIABILITY_TEMPERATURE: f32 = 0.0;

pub struct ReliabilityRunner {
    judge: Judge,
    runs: usize,
}

impl ReliabilityRunner {
    pub fn new(judge: Judge, runs: usize) -> Result<Self> {
        if runs == 0 {
            return Err(EvalError::ConfigError("runs must be at least 1".to_string()));
        }
        Ok(Self { judge, runs })
    }

    async fn score_example(&self, example: &DatasetExample) -> Result<Vec<f64>> {
        let answer = example.golden().unwrap_or_default();
        let context = example.frozen_context();
        let input = JudgeInput {
            question: &example.question,
            answer,
            context: &context,
            ideal_answer: example.ideal(),
        };

        let mut overalls = Vec::with_capacity(self.runs);
        for _ in 0..self.runs {
            let result = self.judge.judge_at(&input, RELIABILITY_TEMPERATURE).await?;
            overalls.push(result.overall);
        }
        Ok(overalls)
    }

    /// Score every example `runs` times and summarise the spread
    ///
    /// The global figures are computed over every individual score, not over
    /// per-example means.
    pub async fn run(&self, dataset: &[DatasetExample]) -> Result<ReliabilitySummary> {
        if dataset.is_empty() {
            return Err(EvalError::EmptyInput("dataset".to_string()));
        }

        info!(
            judge_model = %self.judge.settings().model,
            runs = self.runs,
            examples = dataset.len(),
            "starting reliability run"
        );

        let mut per_example = Vec::with_capacity(dataset.len());
        let mut all_overalls = Vec::with_capacity(dataset.len() * self.runs);

        for (idx, example) in dataset.iter().enumerate() {
            let overalls = self.score_example(example).await?;
            let mean_overall = stats::mean(&overalls).unwrap_or(0.0);
            let std_overall = stats::pstdev(&overalls).unwrap_or(0.0);
            let id = example.resolved_id(idx + 1);

            info!(
                "id={} mean={:.3} std={:.3} overalls={:?}",
                id, mean_overall, std_overall, overalls
            );

            all_overalls.extend_from_slice(&overalls);
            per_example.push(PerExampleReliability {
                id,
                mean_overall,
                std_overall,
                overalls,
            });
        }

        Ok(ReliabilitySummary {
            runs_per_example: self.runs,
            dataset_size: dataset.len(),
            overall_mean: stats::mean(&all_overalls).unwrap_or(0.0),
            overall_std: stats::pstdev(&all_overalls).unwrap_or(0.0),
            per_example,
        })
    }

    /// Run and write the summary as one JSON object
    pub async fn run_to_file(
        &self,
        dataset: &[DatasetExample],
        output: &Path,
    ) -> Result<ReliabilitySummary> {
        let summary = self.run(dataset).await?;
        write_json_pretty(output, &summary)?;
        Ok(summary)
    }
}
