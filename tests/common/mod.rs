//! Shared in-memory collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use raggate::judge::{Judge, JudgeSettings};
use raggate::llm::{ChatModel, ChatRequest};
use raggate::rag::{AnswerGenerator, Chunk, IndexBuilder, RagAnswer};
use raggate::{EvalError, Result};

/// Ordered log of collaborator calls, shared between doubles
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn rubric(overall: f64) -> String {
    format!(
        r#"{{"relevance": 0.9, "correctness": 0.8, "grounding": 1.0, "completeness": 0.7, "reasoning_quality": 0.9, "overall": {}, "explanation": "ok"}}"#,
        overall
    )
}

/// Chat model that replays scripted replies, then repeats the last one
pub struct ScriptedChat {
    replies: Mutex<VecDeque<Result<String>>>,
    last: Mutex<Option<String>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn new(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every call scores `overall`
    pub fn constant(overall: f64) -> Arc<Self> {
        Self::new(vec![Ok(rubric(overall))])
    }

    /// One reply per overall, in order
    pub fn overalls(overalls: &[f64]) -> Arc<Self> {
        Self::new(overalls.iter().map(|o| Ok(rubric(*o))).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                Ok(reply)
            }
            Some(Err(err)) => Err(err),
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| EvalError::LlmApiError("no scripted reply".to_string())),
        }
    }
}

pub fn judge_with(chat: Arc<ScriptedChat>, max_retries: u32) -> Judge {
    Judge::new(
        chat,
        JudgeSettings {
            max_retries,
            retry_base_delay_ms: 1,
            ..JudgeSettings::default()
        },
    )
}

pub fn chunk(id: &str, text: &str, distance: f64) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        source: Some("gdpr.pdf".to_string()),
        chunk_index: id.rsplit('-').next().and_then(|i| i.parse().ok()),
        distance: Some(distance),
        metadata: serde_json::Map::new(),
    }
}

/// Generator answering every question with the same cited answer
pub struct FixedGenerator {
    pub answer: String,
    pub chunks: Vec<Chunk>,
    pub events: EventLog,
}

impl FixedGenerator {
    pub fn new(answer: &str, chunks: Vec<Chunk>, events: EventLog) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            chunks,
            events,
        })
    }
}

#[async_trait]
impl AnswerGenerator for FixedGenerator {
    async fn answer(&self, question: &str, top_k: usize) -> Result<RagAnswer> {
        self.events
            .lock()
            .unwrap()
            .push(format!("answer top_k={} q={}", top_k, question));
        Ok(RagAnswer {
            question: question.to_string(),
            answer: self.answer.clone(),
            chunks: self.chunks.iter().take(top_k).cloned().collect(),
        })
    }
}

/// Index builder that only records rebuild requests
pub struct RecordingIndex {
    pub events: EventLog,
}

#[async_trait]
impl IndexBuilder for RecordingIndex {
    async fn rebuild(&self, chunk_size: usize, chunk_overlap: usize) -> Result<usize> {
        self.events
            .lock()
            .unwrap()
            .push(format!("rebuild chunk_size={} overlap={}", chunk_size, chunk_overlap));
        Ok(10)
    }
}
