//! raggate - evaluation and quality gating for retrieval-augmented QA
//!
//! # Architecture
//!
//! - **judge**: rubric scoring through an LLM, with retry
//! - **eval**: evaluation, ablation and reliability runners plus artifacts
//! - **gates**: quality, refusal, hallucination and stability checks
//! - **monitoring**: per-request metrics, drift and alerts
//! - **rag**: retrieval, ingestion and answer generation collaborators

pub mod errors;

// Re-export commonly used types
pub use errors::{EvalError, Result};

pub mod cli;
pub mod dataset;
pub mod eval;
pub mod gates;
pub mod judge;
pub mod llm;
pub mod monitoring;
pub mod rag;
