// Qdrant-backed chunk store
use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        CreateCollectionBuilder, DeleteCollectionBuilder, Distance, PointStruct,
        ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
        VectorParamsBuilder,
    },
    Qdrant,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{EvalError, Result};
use crate::llm::Embedder;
use crate::rag::retrieval::{Chunk, Retriever};

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_COLLECTION: &str = "rag-docs";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

const DOCUMENT_KEY: &str = "document";
const CHUNK_ID_KEY: &str = "chunk_id";

/// Store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub url: String,
    pub collection: String,
    pub embedding_model: String,
    pub batch_size: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            batch_size: 64,
        }
    }
}

/// A chunk ready to be embedded and stored
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub id: String,
    pub text: String,
    pub source: String,
    pub chunk_index: i64,
}

/// Cosine-distance chunk store
pub struct QdrantStore {
    client: Qdrant,
    embedder: Arc<dyn Embedder>,
    settings: StoreSettings,
}

impl QdrantStore {
    pub fn connect(settings: StoreSettings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let client = Qdrant::from_url(&settings.url).build()?;
        Ok(Self {
            client,
            embedder,
            settings,
        })
    }

    pub fn collection(&self) -> &str {
        &self.settings.collection
    }

    /// Drop the collection if present; the next upsert recreates it
    pub async fn reset(&self) -> Result<()> {
        if self.client.collection_exists(self.collection()).await? {
            self.client
                .delete_collection(DeleteCollectionBuilder::new(self.collection()))
                .await?;
            info!(collection = %self.collection(), "dropped collection");
        }
        Ok(())
    }

    async fn ensure_collection(&self, dim: u64) -> Result<()> {
        if !self.client.collection_exists(self.collection()).await? {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(self.collection())
                        .vectors_config(VectorParamsBuilder::new(dim, Distance::Cosine)),
                )
                .await?;
            debug!(collection = %self.collection(), dim, "created collection");
        }
        Ok(())
    }

    /// Embed and upsert chunks in batches, returning how many were stored
    pub async fn upsert(&self, drafts: &[ChunkDraft]) -> Result<usize> {
        let batch_size = self.settings.batch_size.max(1);
        let mut stored = 0;

        for batch in drafts.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.text.clone()).collect();
            let vectors = self
                .embedder
                .embed(&self.settings.embedding_model, &texts)
                .await?;

            let dim = vectors
                .first()
                .map(|v| v.len() as u64)
                .ok_or_else(|| EvalError::IndexError("embedder returned no vectors".to_string()))?;
            self.ensure_collection(dim).await?;

            let points: Vec<PointStruct> = batch
                .iter()
                .zip(vectors)
                .map(|(draft, vector)| PointStruct::new(point_id(&draft.id), vector, draft_payload(draft)))
                .collect();

            self.client
                .upsert_points(UpsertPointsBuilder::new(self.collection(), points).wait(true))
                .await?;
            stored += batch.len();
        }

        Ok(stored)
    }
}

#[async_trait]
impl Retriever for QdrantStore {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        // An index rebuilt from zero chunks has no collection yet
        if !self.client.collection_exists(self.collection()).await? {
            debug!(collection = %self.collection(), "collection missing, nothing to retrieve");
            return Ok(Vec::new());
        }

        let vectors = self
            .embedder
            .embed(&self.settings.embedding_model, &[query.to_string()])
            .await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| EvalError::IndexError("embedder returned no vectors".to_string()))?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(self.collection(), vector, top_k as u64).with_payload(true),
            )
            .await?;

        let mut chunks: Vec<Chunk> = response.result.into_iter().map(scored_to_chunk).collect();
        chunks.sort_by(|a, b| {
            a.distance
                .unwrap_or(f64::MAX)
                .total_cmp(&b.distance.unwrap_or(f64::MAX))
        });
        Ok(chunks)
    }
}

/// Deterministic point id; Qdrant only accepts integers or UUIDs
pub fn point_id(chunk_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

fn draft_payload(draft: &ChunkDraft) -> HashMap<String, QdrantValue> {
    let mut payload = HashMap::new();
    payload.insert(CHUNK_ID_KEY.to_string(), QdrantValue::from(draft.id.clone()));
    payload.insert(DOCUMENT_KEY.to_string(), QdrantValue::from(draft.text.clone()));
    payload.insert("source".to_string(), QdrantValue::from(draft.source.clone()));
    payload.insert("chunk_index".to_string(), QdrantValue::from(draft.chunk_index));
    payload
}

fn scored_to_chunk(point: ScoredPoint) -> Chunk {
    let mut id = None;
    let mut text = String::new();
    let mut metadata = serde_json::Map::new();

    for (key, value) in &point.payload {
        match key.as_str() {
            DOCUMENT_KEY => text = qdrant_value_to_string(value).unwrap_or_default(),
            CHUNK_ID_KEY => id = qdrant_value_to_string(value),
            _ => {
                if let Some(json_val) = qdrant_to_json_value(value) {
                    metadata.insert(key.clone(), json_val);
                }
            }
        }
    }

    let source = metadata
        .get("source")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let chunk_index = metadata.get("chunk_index").and_then(JsonValue::as_i64);

    Chunk {
        id: id.unwrap_or_else(|| point_id_to_string(&point.id)),
        text,
        source,
        chunk_index,
        distance: Some(1.0 - f64::from(point.score)),
        metadata,
    }
}

fn qdrant_to_json_value(value: &QdrantValue) -> Option<JsonValue> {
    value.kind.as_ref().and_then(|kind| {
        use qdrant_client::qdrant::value::Kind;
        match kind {
            Kind::StringValue(s) => Some(JsonValue::String(s.clone())),
            Kind::IntegerValue(i) => Some(JsonValue::Number((*i).into())),
            Kind::DoubleValue(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
            Kind::BoolValue(b) => Some(JsonValue::Bool(*b)),
            _ => None,
        }
    })
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    value.kind.as_ref().and_then(|kind| {
        use qdrant_client::qdrant::value::Kind;
        match kind {
            Kind::StringValue(s) => Some(s.clone()),
            _ => None,
        }
    })
}

fn point_id_to_string(point_id: &Option<qdrant_client::qdrant::PointId>) -> String {
    point_id
        .as_ref()
        .map(|id| {
            use qdrant_client::qdrant::point_id::PointIdOptions;
            match &id.point_id_options {
                Some(PointIdOptions::Num(n)) => n.to_string(),
                Some(PointIdOptions::Uuid(u)) => u.clone(),
                None => "unknown".to_string(),
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_is_deterministic_uuid() {
        let a = point_id("gdpr.pdf-0");
        assert_eq!(a, point_id("gdpr.pdf-0"));
        assert_ne!(a, point_id("gdpr.pdf-1"));
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_scored_point_maps_to_chunk() {
        let draft = ChunkDraft {
            id: "gdpr.pdf-3".to_string(),
            text: "Article 5".to_string(),
            source: "gdpr.pdf".to_string(),
            chunk_index: 3,
        };
        let point = ScoredPoint {
            id: Some(point_id(&draft.id).into()),
            payload: draft_payload(&draft),
            score: 0.75,
            ..Default::default()
        };

        let chunk = scored_to_chunk(point);
        assert_eq!(chunk.id, "gdpr.pdf-3");
        assert_eq!(chunk.text, "Article 5");
        assert_eq!(chunk.source.as_deref(), Some("gdpr.pdf"));
        assert_eq!(chunk.chunk_index, Some(3));
        assert!((chunk.distance.unwrap() - 0.25).abs() < 1e-9);
        assert!(!chunk.metadata.contains_key(DOCUMENT_KEY));
    }

    #[test]
    fn test_missing_chunk_id_falls_back_to_point_id() {
        let point = ScoredPoint {
            id: Some(qdrant_client::qdrant::PointId::from(7u64)),
            score: 1.0,
            ..Default::default()
        };
        let chunk = scored_to_chunk(point);
        assert_eq!(chunk.id, "7");
        assert_eq!(chunk.distance, Some(0.0));
    }

    #[tokio::test]
    #[ignore] // Integration test - requires Qdrant
    async fn test_retrieve_after_empty_rebuild() {
        struct NoEmbed;
        #[async_trait]
        impl Embedder for NoEmbed {
            async fn embed(&self, _model: &str, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
                Ok(Vec::new())
            }
        }

        let settings = StoreSettings {
            collection: "raggate-empty-index".to_string(),
            ..StoreSettings::default()
        };
        let store = QdrantStore::connect(settings, Arc::new(NoEmbed)).unwrap();
        store.reset().await.unwrap();

        // Zero drafts never create the collection; retrieval stays empty
        assert_eq!(store.upsert(&[]).await.unwrap(), 0);
        let chunks = store.retrieve("What is personal data?", 4).await.unwrap();
        assert!(chunks.is_empty());
    }
}
