//! One-at-a-time parameter sweeps over chunk size and retrieval depth

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::errors::{EvalError, Result};
use crate::eval::io::write_json_pretty;
use crate::eval::record::{AblationKind, AblationResult};
use crate::eval::stats;
use crate::judge::{Judge, JudgeInput};
use crate::rag::ingest::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::rag::{format_context, AnswerGenerator, IndexBuilder};

/// Parameter grid for a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct AblationPlan {
    pub chunk_sizes: Vec<usize>,
    pub top_ks: Vec<usize>,
    pub chunk_overlap: usize,
    /// Held fixed while chunk size varies
    pub baseline_top_k: usize,
    /// Index is rebuilt at this size before the top-k sweep
    pub baseline_chunk_size: usize,
}

impl Default for AblationPlan {
    fn default() -> Self {
        Self {
            chunk_sizes: vec![800, 1000, 1500],
            top_ks: vec![2, 4, 8],
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            baseline_top_k: 4,
            baseline_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

pub struct AblationRunner {
    judge: Judge,
    generator: Arc<dyn AnswerGenerator>,
    index: Arc<dyn IndexBuilder>,
}

impl AblationRunner {
    pub fn new(judge: Judge, generator: Arc<dyn AnswerGenerator>, index: Arc<dyn IndexBuilder>) -> Self {
        Self {
            judge,
            generator,
            index,
        }
    }

    /// Mean judge score over all questions at one retrieval depth
    async fn score_questions(&self, questions: &[String], top_k: usize) -> Result<Vec<f64>> {
        let mut overalls = Vec::with_capacity(questions.len());
        for question in questions {
            let rag = self.generator.answer(question, top_k).await?;
            let context = format_context(&rag.chunks);
            let result = self
                .judge
                .judge(&JudgeInput {
                    question,
                    answer: &rag.answer,
                    context: &context,
                    ideal_answer: None,
                })
                .await?;
            overalls.push(result.overall);
        }
        Ok(overalls)
    }

    fn summarize(
        ablation: AblationKind,
        chunk_size: usize,
        chunk_overlap: usize,
        top_k: usize,
        overalls: &[f64],
    ) -> AblationResult {
        AblationResult {
            ablation,
            chunk_size,
            chunk_overlap,
            top_k,
            mean_overall: stats::mean(overalls).unwrap_or(0.0),
            n: overalls.len(),
        }
    }

    /// Run both sweeps, chunk size first, and return results in run order
    pub async fn run(&self, questions: &[String], plan: &AblationPlan) -> Result<Vec<AblationResult>> {
        if questions.is_empty() {
            return Err(EvalError::EmptyInput("dataset".to_string()));
        }

        let mut results = Vec::with_capacity(plan.chunk_sizes.len() + plan.top_ks.len());

        for &chunk_size in &plan.chunk_sizes {
            let indexed = self.index.rebuild(chunk_size, plan.chunk_overlap).await?;
            info!(chunk_size, indexed, "rebuilt index");

            let overalls = self.score_questions(questions, plan.baseline_top_k).await?;
            let result = Self::summarize(
                AblationKind::ChunkSize,
                chunk_size,
                plan.chunk_overlap,
                plan.baseline_top_k,
                &overalls,
            );
            info!("[chunk_size={}] mean_overall={:.3}", chunk_size, result.mean_overall);
            results.push(result);
        }

        // The last chunk-size rebuild must not leak into the top-k sweep
        let indexed = self
            .index
            .rebuild(plan.baseline_chunk_size, plan.chunk_overlap)
            .await?;
        info!(chunk_size = plan.baseline_chunk_size, indexed, "rebuilt baseline index");

        for &top_k in &plan.top_ks {
            let overalls = self.score_questions(questions, top_k).await?;
            let result = Self::summarize(
                AblationKind::TopK,
                plan.baseline_chunk_size,
                plan.chunk_overlap,
                top_k,
                &overalls,
            );
            info!("[top_k={}] mean_overall={:.3}", top_k, result.mean_overall);
            results.push(result);
        }

        Ok(results)
    }

    /// Run both sweeps and write the results as one JSON array
    pub async fn run_to_file(
        &self,
        questions: &[String],
        plan: &AblationPlan,
        output: &Path,
    ) -> Result<Vec<AblationResult>> {
        let results = self.run(questions, plan).await?;
        write_json_pretty(output, &results)?;
        Ok(results)
    }
}
