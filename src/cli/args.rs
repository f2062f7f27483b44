//! Command-line argument parsing for raggate
//!
//! Provides clap-based CLI with one subcommand per runner, gate and
//! monitoring task.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::eval::reliability::DEFAULT_RUNS;
use crate::eval::runner::DEFAULT_TOP_K;
use crate::eval::EvalMode;
use crate::gates::{
    DEFAULT_MAX_HALLUCINATION_RATE, DEFAULT_MAX_STD, DEFAULT_MIN_OVERALL,
    DEFAULT_MIN_REFUSAL_RATE,
};
use crate::rag::ingest::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// raggate - evaluate, gate and monitor a retrieval-augmented QA pipeline
#[derive(Parser, Debug)]
#[command(name = "raggate")]
#[command(version)]
#[command(about = "Judge, gate and monitor RAG answer quality", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.raggate/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Judge every dataset example and write a results file
    Eval(EvalArgs),

    /// Sweep chunk size and top-k, rebuilding the index as needed
    Ablate(AblateArgs),

    /// Re-judge frozen examples to measure judge variance
    Reliability(ReliabilityArgs),

    /// Check an artifact against a threshold
    #[command(subcommand)]
    Gate(GateCommand),

    /// Index a directory of PDFs
    Ingest(IngestArgs),

    /// Answer one question and log an inference metric
    Ask(AskArgs),

    /// Summarise a metrics log, raise alerts and report drift
    Monitor(MonitorArgs),
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Dataset JSON (list of examples)
    #[arg(long)]
    pub dataset: PathBuf,

    /// Results file (line-delimited JSON)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// ci: frozen context / nightly: live retrieval and generation
    #[arg(long, value_enum, default_value_t = EvalMode::Ci)]
    pub mode: EvalMode,

    /// Retrieval depth in nightly mode
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Judge model (overrides config)
    #[arg(long)]
    pub judge_model: Option<String>,
}

#[derive(Args, Debug)]
pub struct AblateArgs {
    /// Dataset JSON; only questions are used
    #[arg(long)]
    pub dataset: PathBuf,

    /// Directory of PDFs to ingest
    #[arg(long)]
    pub pdf_dir: Option<PathBuf>,

    /// Comma-separated top_k values
    #[arg(long, value_delimiter = ',', default_value = "2,4,8")]
    pub topk: Vec<usize>,

    /// Comma-separated chunk sizes
    #[arg(long, value_delimiter = ',', default_value = "800,1000,1500")]
    pub chunk_sizes: Vec<usize>,

    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,

    /// Ablation results (JSON array)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Judge model (overrides config)
    #[arg(long)]
    pub judge_model: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReliabilityArgs {
    /// Frozen-context dataset JSON
    #[arg(long)]
    pub dataset: PathBuf,

    /// Judge calls per example
    #[arg(long, default_value_t = DEFAULT_RUNS)]
    pub runs: usize,

    /// Reliability summary (JSON object)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Judge model (overrides config)
    #[arg(long)]
    pub judge_model: Option<String>,
}

/// Gate subcommands
#[derive(Subcommand, Debug)]
pub enum GateCommand {
    /// Fail if mean overall score is below the minimum
    Quality {
        #[arg(long)]
        results: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MIN_OVERALL)]
        min_overall: f64,
    },

    /// Fail if the refusal rate is below the minimum
    Refusal {
        #[arg(long)]
        results: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MIN_REFUSAL_RATE)]
        min_refusal_rate: f64,
    },

    /// Fail if the uncited, non-refusing answer rate is above the maximum
    Hallucination {
        #[arg(long)]
        results: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MAX_HALLUCINATION_RATE)]
        max_hallucination_rate: f64,
    },

    /// Fail if judge score std is above the maximum
    Stability {
        #[arg(long)]
        summary: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MAX_STD)]
        max_std: f64,
    },
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory containing PDFs
    #[arg(long)]
    pub pdf_dir: Option<PathBuf>,

    /// Drop the collection before ingesting
    #[arg(long)]
    pub reset: bool,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    #[arg(value_name = "QUESTION")]
    pub question: String,

    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Metrics log (line-delimited JSON)
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Baseline JSON
    #[arg(long)]
    pub baseline: Option<PathBuf>,
}
