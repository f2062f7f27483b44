//! Retrieved chunks and citation-numbered context blocks
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dataset::NO_CONTEXT;
use crate::errors::Result;

/// A retrieved slice of a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source: Option<String>,
    pub chunk_index: Option<i64>,
    /// Lower is a closer match
    pub distance: Option<f64>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Ranked chunk lookup, best match (smallest distance) first
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>>;
}

/// Format chunks as `[1] text`, `[2] text`, ... separated by blank lines
///
/// Citations are positional: `chunk_index` is per-document and sparse, so
/// it is never used as a citation number.
pub fn format_context(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT.to_string();
    }

    chunks
        .iter()
        .enumerate()
        .map(|(idx, chunk)| format!("[{}] {}", idx + 1, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Retrieval distances that are present, in rank order
pub fn distances(chunks: &[Chunk]) -> Vec<f64> {
    chunks.iter().filter_map(|chunk| chunk.distance).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, text: &str, chunk_index: i64) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: text.to_string(),
            source: Some("gdpr.pdf".to_string()),
            chunk_index: Some(chunk_index),
            distance: Some(0.3),
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_context(&[]), NO_CONTEXT);
    }

    #[test]
    fn test_format_uses_positions_not_chunk_index() {
        let chunks = vec![chunk("a-17", "First", 17), chunk("b-3", "Second", 3)];
        assert_eq!(format_context(&chunks), "[1] First\n\n[2] Second");
    }

    #[test]
    fn test_distances_skip_missing() {
        let mut chunks = vec![chunk("a", "x", 0), chunk("b", "y", 1)];
        chunks[1].distance = None;
        assert_eq!(distances(&chunks), vec![0.3]);
    }
}
