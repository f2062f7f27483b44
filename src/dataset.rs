//! Labeled evaluation datasets
//!
//! A dataset is a JSON list of examples. Frozen-context examples also carry
//! the retrieval context and a previously generated answer under one of
//! `GOLDEN_ANSWER_FIELDS`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::errors::{EvalError, Result};
use crate::eval::record::RetrievalDebug;

/// Golden answer field names, highest precedence first
pub const GOLDEN_ANSWER_FIELDS: [&str; 2] = ["golden_rag_answer", "golden_answer"];

/// Context sentinel used when an example has no context
pub const NO_CONTEXT: &str = "No relevant context found.";

/// One labeled example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetExample {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    #[serde(default)]
    pub ideal_answer: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub golden_rag_answer: Option<String>,
    #[serde(default)]
    pub golden_answer: Option<String>,
    /// Chunks that produced the golden answer, copied into ci records
    #[serde(default)]
    pub retrieved_chunks: Vec<RetrievalDebug>,
}

impl DatasetExample {
    /// Example id, or `ex<position>` (1-based) when absent
    pub fn resolved_id(&self, position: usize) -> String {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("ex{}", position))
    }

    /// Look up a golden answer field by name
    fn golden_field(&self, name: &str) -> Option<&str> {
        match name {
            "golden_rag_answer" => self.golden_rag_answer.as_deref(),
            "golden_answer" => self.golden_answer.as_deref(),
            _ => None,
        }
    }

    /// First non-empty golden answer in `GOLDEN_ANSWER_FIELDS` order
    pub fn golden(&self) -> Option<&str> {
        GOLDEN_ANSWER_FIELDS
            .iter()
            .filter_map(|name| self.golden_field(name))
            .find(|answer| !answer.is_empty())
    }

    /// Frozen context as a single citation-numbered block
    pub fn frozen_context(&self) -> String {
        match self.context.as_deref() {
            Some(text) if !text.is_empty() => format!("[1] {}", text),
            _ => NO_CONTEXT.to_string(),
        }
    }

    pub fn ideal(&self) -> Option<&str> {
        self.ideal_answer.as_deref()
    }
}

/// Load a dataset file; it must be a non-empty JSON list of examples
pub fn load_dataset(path: &Path) -> Result<Vec<DatasetExample>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        EvalError::DatasetError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_dataset(&contents, &path.display().to_string())
}

/// Parse dataset text; `label` names the source in errors
pub fn parse_dataset(contents: &str, label: &str) -> Result<Vec<DatasetExample>> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| EvalError::DatasetError(format!("{} is not valid JSON: {}", label, e)))?;

    let items = match value {
        Value::Array(items) => items,
        _ => {
            return Err(EvalError::DatasetError(format!(
                "{}: dataset must be a JSON list",
                label
            )))
        }
    };

    if items.is_empty() {
        return Err(EvalError::EmptyInput(label.to_string()));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value::<DatasetExample>(item).map_err(|e| {
                EvalError::DatasetError(format!("{}: example {} is invalid: {}", label, idx + 1, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_example() {
        let examples = parse_dataset(r#"[{"question": "What is Article 5?"}]"#, "mem").unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].resolved_id(1), "ex1");
        assert!(examples[0].golden().is_none());
        assert_eq!(examples[0].frozen_context(), NO_CONTEXT);
    }

    #[test]
    fn test_golden_answer_precedence() {
        let examples = parse_dataset(
            r#"[
                {"id": "a", "question": "q", "golden_rag_answer": "rag", "golden_answer": "plain"},
                {"id": "b", "question": "q", "golden_answer": "plain"},
                {"id": "c", "question": "q", "golden_rag_answer": "", "golden_answer": "fallback"}
            ]"#,
            "mem",
        )
        .unwrap();

        assert_eq!(examples[0].golden(), Some("rag"));
        assert_eq!(examples[1].golden(), Some("plain"));
        assert_eq!(examples[2].golden(), Some("fallback"));
        assert_eq!(examples[1].resolved_id(2), "b");
    }

    #[test]
    fn test_frozen_context_is_citation_numbered() {
        let examples =
            parse_dataset(r#"[{"question": "q", "context": "Data must be minimised."}]"#, "mem")
                .unwrap();
        assert_eq!(examples[0].frozen_context(), "[1] Data must be minimised.");
    }

    #[test]
    fn test_not_a_list_is_rejected() {
        let err = parse_dataset(r#"{"question": "q"}"#, "mem").unwrap_err();
        assert!(matches!(err, EvalError::DatasetError(_)));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let err = parse_dataset("[]", "mem").unwrap_err();
        assert!(matches!(err, EvalError::EmptyInput(_)));
    }

    #[test]
    fn test_missing_question_is_rejected() {
        let err = parse_dataset(r#"[{"id": "x"}]"#, "mem").unwrap_err();
        assert!(err.to_string().contains("example 1"));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let examples = parse_dataset(r#"[{"question": "q", "tags": ["gdpr"]}]"#, "mem").unwrap();
        assert_eq!(examples[0].question, "q");
        assert!(examples[0].retrieved_chunks.is_empty());
    }

    #[test]
    fn test_retrieved_chunks_are_kept() {
        let examples = parse_dataset(
            r#"[{"question": "q", "retrieved_chunks": [{"id": "gdpr.pdf-4", "source": "gdpr.pdf", "chunk_index": 4, "distance": 0.21}, {"id": "doc-1"}]}]"#,
            "mem",
        )
        .unwrap();
        let chunks = &examples[0].retrieved_chunks;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_index, Some(4));
        assert_eq!(chunks[0].distance, Some(0.21));
        assert_eq!(chunks[1].source, None);
    }
}
