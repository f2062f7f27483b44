// Evaluation runners and their persisted artifacts
//
// - runner: judged record per dataset example (ci / nightly)
// - ablation: chunk-size and top-k sweeps
// - reliability: repeated judging of frozen inputs

pub mod ablation;
pub mod io;
pub mod record;
pub mod reliability;
pub mod runner;
pub mod stats;

pub use ablation::{AblationPlan, AblationRunner};
pub use io::{read_json, read_jsonl, write_json_pretty, JsonlWriter};
pub use record::{
    AblationKind, AblationResult, EvalMode, EvaluationRecord, PerExampleReliability,
    ReliabilitySummary, RetrievalDebug, Scores,
};
pub use reliability::ReliabilityRunner;
pub use runner::{EvaluationRunner, EvaluationSummary};
