// End-to-end answer pipeline: retrieve -> format context -> generate
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::errors::Result;
use crate::llm::{ChatModel, ChatRequest};
use crate::rag::prompts::{build_rag_user_prompt, RAG_SYSTEM_PROMPT};
use crate::rag::retrieval::{format_context, Chunk, Retriever};

/// Answer generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub model: String,
    pub temperature: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.2,
        }
    }
}

/// Generated answer plus the chunks it was grounded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub question: String,
    pub answer: String,
    pub chunks: Vec<Chunk>,
}

/// Answers a question from retrieved context
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn answer(&self, question: &str, top_k: usize) -> Result<RagAnswer>;
}

/// Retrieval + chat-model answer pipeline
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    chat: Arc<dyn ChatModel>,
    settings: GeneratorSettings,
}

impl RagPipeline {
    /// Create new pipeline
    pub fn new(
        retriever: Arc<dyn Retriever>,
        chat: Arc<dyn ChatModel>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            retriever,
            chat,
            settings,
        }
    }
}

#[async_trait]
impl AnswerGenerator for RagPipeline {
    async fn answer(&self, question: &str, top_k: usize) -> Result<RagAnswer> {
        // Step 1: Retrieve
        let chunks = self.retriever.retrieve(question, top_k).await?;
        debug!(top_k, retrieved = chunks.len(), "retrieved context");

        // Step 2: Ground the prompt
        let context = format_context(&chunks);
        let request = ChatRequest {
            model: self.settings.model.clone(),
            system: RAG_SYSTEM_PROMPT.to_string(),
            user: build_rag_user_prompt(&context, question),
            temperature: self.settings.temperature,
        };

        // Step 3: Generate
        let answer = self.chat.complete(&request).await?;

        Ok(RagAnswer {
            question: question.to_string(),
            answer,
            chunks,
        })
    }
}
