//! Evaluation runner: one judged record per dataset example

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::dataset::DatasetExample;
use crate::errors::{EvalError, Result};
use crate::eval::io::JsonlWriter;
use crate::eval::record::{EvalMode, EvaluationRecord, RetrievalDebug, Scores};
use crate::eval::stats;
use crate::judge::{Judge, JudgeInput};
use crate::rag::{format_context, AnswerGenerator};

pub const DEFAULT_TOP_K: usize = 4;

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub output: PathBuf,
    pub records: usize,
    pub mean_overall: f64,
}

pub struct EvaluationRunner {
    judge: Judge,
    generator: Option<Arc<dyn AnswerGenerator>>,
    top_k: usize,
}

impl EvaluationRunner {
    /// Runner for frozen-context (`ci`) evaluation only
    pub fn new(judge: Judge) -> Self {
        Self {
            judge,
            generator: None,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Attach the live answer pipeline used in `nightly` mode
    pub fn with_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Produce and judge one record per example
    pub async fn evaluate_example(
        &self,
        example: &DatasetExample,
        position: usize,
        mode: EvalMode,
    ) -> Result<EvaluationRecord> {
        let (answer, context, retrieval) = match mode {
            EvalMode::Ci => (
                example.golden().unwrap_or_default().to_string(),
                example.frozen_context(),
                example.retrieved_chunks.clone(),
            ),
            EvalMode::Nightly => {
                let generator = self.generator.as_ref().ok_or_else(|| {
                    EvalError::ConfigError("nightly mode requires an answer generator".to_string())
                })?;
                let rag = generator.answer(&example.question, self.top_k).await?;
                let retrieval = rag.chunks.iter().map(RetrievalDebug::from).collect::<Vec<_>>();
                (rag.answer, format_context(&rag.chunks), retrieval)
            }
        };

        let result = self
            .judge
            .judge(&JudgeInput {
                question: &example.question,
                answer: &answer,
                context: &context,
                ideal_answer: example.ideal(),
            })
            .await?;

        Ok(EvaluationRecord {
            id: example.resolved_id(position),
            question: example.question.clone(),
            ideal_answer: example.ideal_answer.clone(),
            answer,
            mode,
            scores: Scores::from(&result),
            explanation: result.explanation,
            retrieval,
        })
    }

    /// Evaluate the dataset in order, writing each record as soon as it is judged
    ///
    /// The output file is truncated up front. A fatal judge failure stops the
    /// run; records already written stay on disk.
    pub async fn run(
        &self,
        dataset: &[DatasetExample],
        mode: EvalMode,
        output: &Path,
    ) -> Result<EvaluationSummary> {
        if dataset.is_empty() {
            return Err(EvalError::EmptyInput("dataset".to_string()));
        }
        if mode == EvalMode::Nightly && self.generator.is_none() {
            return Err(EvalError::ConfigError(
                "nightly mode requires an answer generator".to_string(),
            ));
        }

        let mut writer = JsonlWriter::create(output)?;
        let mut overalls = Vec::with_capacity(dataset.len());
        let total = dataset.len();
        info!(
            mode = mode.as_str(),
            judge_model = %self.judge.settings().model,
            examples = total,
            "starting evaluation"
        );

        for (idx, example) in dataset.iter().enumerate() {
            let position = idx + 1;
            let record = self.evaluate_example(example, position, mode).await?;
            info!(
                "[{}/{}] id={} overall={:.3}",
                position, total, record.id, record.scores.overall
            );

            overalls.push(record.scores.overall);
            writer.append(&record)?;
        }

        let mean_overall = stats::mean(&overalls).unwrap_or(0.0);
        Ok(EvaluationSummary {
            output: writer.path().to_path_buf(),
            records: writer.written(),
            mean_overall,
        })
    }
}
