//! LLM-as-judge scoring
//!
//! Scores one answer on five rubric dimensions plus a holistic `overall`.
//! Transient failures are retried with bounded backoff; when every attempt
//! fails the call fails, never returning a substitute score.

pub mod parse;
pub mod prompt;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::llm::{ChatModel, ChatRequest, RetryManager};

pub use parse::{extract_json_object, parse_rubric, RawRubric};

/// Numeric fields every judge reply must carry
pub const SCORE_FIELDS: [&str; 6] = [
    "relevance",
    "correctness",
    "grounding",
    "completeness",
    "reasoning_quality",
    "overall",
];

/// Default judge model
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4.1-mini";

/// Scored rubric for one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    pub relevance: f64,
    pub correctness: f64,
    pub grounding: f64,
    pub completeness: f64,
    pub reasoning_quality: f64,
    pub overall: f64,
    pub explanation: String,
}

impl JudgeResult {
    /// Validate a raw rubric, clamping finite scores into [0, 1] when asked
    pub fn from_raw(raw: RawRubric, clamp: bool) -> Self {
        let explanation = match raw.explanation {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
        };

        let fix = |name: &str, value: f64| {
            if clamp && !(0.0..=1.0).contains(&value) {
                let clamped = value.clamp(0.0, 1.0);
                warn!(field = name, value, clamped, "judge score outside [0, 1], clamping");
                clamped
            } else {
                value
            }
        };

        Self {
            relevance: fix("relevance", raw.relevance),
            correctness: fix("correctness", raw.correctness),
            grounding: fix("grounding", raw.grounding),
            completeness: fix("completeness", raw.completeness),
            reasoning_quality: fix("reasoning_quality", raw.reasoning_quality),
            overall: fix("overall", raw.overall),
            explanation,
        }
    }
}

/// Inputs for one judged answer
#[derive(Debug, Clone, Copy)]
pub struct JudgeInput<'a> {
    pub question: &'a str,
    pub answer: &'a str,
    pub context: &'a str,
    pub ideal_answer: Option<&'a str>,
}

/// Judge call parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeSettings {
    pub model: String,
    pub temperature: f32,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub clamp_scores: bool,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_JUDGE_MODEL.to_string(),
            temperature: 0.0,
            max_retries: 2,
            retry_base_delay_ms: 500,
            clamp_scores: true,
        }
    }
}

/// Rubric judge over a chat model
#[derive(Clone)]
pub struct Judge {
    chat: Arc<dyn ChatModel>,
    settings: JudgeSettings,
    retry: RetryManager,
}

impl Judge {
    /// Create judge with the given settings
    pub fn new(chat: Arc<dyn ChatModel>, settings: JudgeSettings) -> Self {
        let retry = RetryManager::with_config(settings.max_retries, settings.retry_base_delay_ms);
        Self {
            chat,
            settings,
            retry,
        }
    }

    /// Get current settings
    pub fn settings(&self) -> &JudgeSettings {
        &self.settings
    }

    /// Score one answer at the configured temperature
    pub async fn judge(&self, input: &JudgeInput<'_>) -> Result<JudgeResult> {
        self.judge_at(input, self.settings.temperature).await
    }

    /// Score one answer at an explicit temperature
    pub async fn judge_at(&self, input: &JudgeInput<'_>, temperature: f32) -> Result<JudgeResult> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            system: prompt::JUDGE_SYSTEM_PROMPT.to_string(),
            user: prompt::build_user_prompt(
                input.question,
                input.answer,
                input.context,
                input.ideal_answer,
            ),
            temperature,
        };
        let clamp = self.settings.clamp_scores;

        self.retry
            .execute_with_retry(|| {
                let request = &request;
                async move {
                    let raw = self.chat.complete(request).await?;
                    debug!(chars = raw.len(), "judge replied");
                    let rubric = parse_rubric(&raw)?;
                    Ok(JudgeResult::from_raw(rubric, clamp))
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalError;
    use async_trait::async_trait;
    use quickcheck_macros::quickcheck;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String>>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for Scripted {
        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(EvalError::LlmApiError("script exhausted".to_string())))
        }
    }

    fn reply(overall: f64) -> Result<String> {
        Ok(format!(
            r#"{{"relevance":1,"correctness":1,"grounding":1,"completeness":1,"reasoning_quality":1,"overall":{},"explanation":"ok"}}"#,
            overall
        ))
    }

    fn settings(max_retries: u32) -> JudgeSettings {
        JudgeSettings {
            max_retries,
            retry_base_delay_ms: 0,
            ..Default::default()
        }
    }

    fn input() -> JudgeInput<'static> {
        JudgeInput {
            question: "What is GDPR?",
            answer: "A regulation [1].",
            context: "[1] GDPR is a regulation.",
            ideal_answer: None,
        }
    }

    #[tokio::test]
    async fn test_judge_success() {
        let chat = Scripted::new(vec![reply(0.9)]);
        let judge = Judge::new(chat.clone(), settings(2));

        let result = judge.judge(&input()).await.unwrap();
        assert_eq!(result.overall, 0.9);
        assert_eq!(result.explanation, "ok");

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].temperature, 0.0);
        assert!(seen[0].user.contains("What is GDPR?"));
    }

    #[tokio::test]
    async fn test_judge_retries_malformed_then_succeeds() {
        let chat = Scripted::new(vec![
            Ok("Sorry, here you go".to_string()),
            Err(EvalError::LlmApiError("HTTP 502".to_string())),
            reply(0.6),
        ]);
        let judge = Judge::new(chat.clone(), settings(2));

        let result = judge.judge(&input()).await.unwrap();
        assert_eq!(result.overall, 0.6);
        assert_eq!(chat.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_judge_fails_after_exhausting_retries() {
        let chat = Scripted::new(vec![
            Ok("nope".to_string()),
            Ok("still nope".to_string()),
            Ok("{\"overall\": 1}".to_string()),
        ]);
        let judge = Judge::new(chat.clone(), settings(2));

        let err = judge.judge(&input()).await.unwrap_err();
        match err {
            EvalError::RetryExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, EvalError::MalformedJudgeOutput(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_settings_reflect_configuration() {
        let judge = Judge::new(
            Scripted::new(Vec::new()),
            JudgeSettings {
                model: "gpt-4o".to_string(),
                ..settings(3)
            },
        );
        assert_eq!(judge.settings().model, "gpt-4o");
        assert_eq!(judge.settings().max_retries, 3);
    }

    #[tokio::test]
    async fn test_judge_clamps_out_of_range() {
        let chat = Scripted::new(vec![reply(1.7)]);
        let judge = Judge::new(chat, settings(0));
        let result = judge.judge(&input()).await.unwrap();
        assert_eq!(result.overall, 1.0);
    }

    #[tokio::test]
    async fn test_judge_keeps_out_of_range_when_not_clamping() {
        let chat = Scripted::new(vec![reply(-0.5)]);
        let judge = Judge::new(
            chat,
            JudgeSettings {
                clamp_scores: false,
                ..settings(0)
            },
        );
        let result = judge.judge(&input()).await.unwrap();
        assert_eq!(result.overall, -0.5);
    }

    #[test]
    fn test_non_string_explanation_is_stringified() {
        let raw = RawRubric {
            relevance: 1.0,
            correctness: 1.0,
            grounding: 1.0,
            completeness: 1.0,
            reasoning_quality: 1.0,
            overall: 1.0,
            explanation: Some(serde_json::json!(["a", "b"])),
        };
        let result = JudgeResult::from_raw(raw, true);
        assert_eq!(result.explanation, r#"["a","b"]"#);
    }

    #[quickcheck]
    fn prop_clamped_scores_stay_in_unit_range(overall: f64) -> bool {
        if !overall.is_finite() {
            return true;
        }
        let judge = Judge::new(Scripted::new(vec![reply(overall)]), settings(0));
        match tokio_test::block_on(judge.judge(&input())) {
            Ok(result) => (0.0..=1.0).contains(&result.overall),
            Err(_) => false,
        }
    }
}
