//! Language-model boundary
//!
//! The judge, the answer generator and the index builder reach models only
//! through the traits below, so runners can be exercised with in-memory
//! doubles.

pub mod client;
pub mod retry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub use client::{OpenAiClient, DEFAULT_BASE_URL};
pub use retry::RetryManager;

/// One chat completion request: a system prompt plus a single user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

/// Produces a completion for a chat request
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Embeds texts into dense vectors, one per input, in input order
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
