// Retrieval-augmented answering
//
// Components:
// - Retrieval: ranked chunk lookup and citation-numbered context blocks
// - Store: Qdrant collection holding embedded chunks
// - Ingest: PDF extraction, recursive splitting, index rebuilds
// - Pipeline: retrieve -> prompt -> generate

pub mod ingest;
pub mod pipeline;
pub mod prompts;
pub mod retrieval;
pub mod splitter;
pub mod store;

// Re-export key types
pub use ingest::{IndexBuilder, PdfIndexBuilder};
pub use pipeline::{AnswerGenerator, GeneratorSettings, RagAnswer, RagPipeline};
pub use retrieval::{distances, format_context, Chunk, Retriever};
pub use splitter::TextSplitter;
pub use store::{QdrantStore, StoreSettings};
