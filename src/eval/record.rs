//! Persisted evaluation artifacts

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::judge::JudgeResult;
use crate::rag::Chunk;

/// Evaluation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EvalMode {
    /// Frozen context and answer taken from the dataset
    Ci,
    /// Live retrieval and generation per question
    Nightly,
}

impl EvalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ci => "ci",
            Self::Nightly => "nightly",
        }
    }
}

/// Rubric scores as persisted in a results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(default)]
    pub relevance: f64,
    #[serde(default)]
    pub correctness: f64,
    #[serde(default)]
    pub grounding: f64,
    #[serde(default)]
    pub completeness: f64,
    #[serde(default)]
    pub reasoning_quality: f64,
    pub overall: f64,
}

impl From<&JudgeResult> for Scores {
    fn from(result: &JudgeResult) -> Self {
        Self {
            relevance: result.relevance,
            correctness: result.correctness,
            grounding: result.grounding,
            completeness: result.completeness,
            reasoning_quality: result.reasoning_quality,
            overall: result.overall,
        }
    }
}

/// Retrieval debug entry for one chunk behind an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalDebug {
    pub id: String,
    pub source: Option<String>,
    pub chunk_index: Option<i64>,
    pub distance: Option<f64>,
}

impl From<&Chunk> for RetrievalDebug {
    fn from(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id.clone(),
            source: chunk.source.clone(),
            chunk_index: chunk.chunk_index,
            distance: chunk.distance,
        }
    }
}

/// One judged example, one line of a results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub ideal_answer: Option<String>,
    #[serde(default)]
    pub answer: String,
    pub mode: EvalMode,
    pub scores: Scores,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub retrieval: Vec<RetrievalDebug>,
}

/// Which parameter an ablation entry varied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AblationKind {
    ChunkSize,
    TopK,
}

/// Mean judge score for one swept parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AblationResult {
    pub ablation: AblationKind,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub mean_overall: f64,
    pub n: usize,
}

/// Judge score spread for one example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerExampleReliability {
    pub id: String,
    pub mean_overall: f64,
    pub std_overall: f64,
    pub overalls: Vec<f64>,
}

/// Judge score spread across a whole dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilitySummary {
    pub runs_per_example: usize,
    pub dataset_size: usize,
    pub overall_mean: f64,
    pub overall_std: f64,
    pub per_example: Vec<PerExampleReliability>,
}
