//! PDF ingestion: text extraction, chunking and index rebuilds
//!
//! Text comes from the `pdftotext` tool (poppler-utils). Pages are joined
//! with a newline, blank pages dropped.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{EvalError, Result};
use crate::rag::splitter::TextSplitter;
use crate::rag::store::{ChunkDraft, QdrantStore};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Rebuilds the retrieval index from scratch with new chunking parameters
#[async_trait]
pub trait IndexBuilder: Send + Sync {
    /// Returns the number of chunks indexed
    async fn rebuild(&self, chunk_size: usize, chunk_overlap: usize) -> Result<usize>;
}

/// Extract the text layer of one PDF
pub async fn extract_pdf_text(pdf_path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg("-f")
        .arg("1")
        .arg(pdf_path)
        .arg("-")
        .output()
        .await
        .map_err(|e| {
            EvalError::ToolError(format!(
                "failed to execute pdftotext for {}: {}",
                pdf_path.display(),
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EvalError::ToolError(format!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    Ok(join_pages(&raw))
}

/// Split form-feed separated pages and rejoin the non-blank ones
pub fn join_pages(raw: &str) -> String {
    raw.split('\u{000C}')
        .map(|page| page.replace('\u{0000}', ""))
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chunk one document into `<file name>-<i>` drafts
pub fn chunk_document(file_name: &str, text: &str, splitter: &TextSplitter) -> Vec<ChunkDraft> {
    splitter
        .split(text)
        .into_iter()
        .enumerate()
        .map(|(idx, chunk)| ChunkDraft {
            id: format!("{}-{}", file_name, idx),
            text: chunk,
            source: file_name.to_string(),
            chunk_index: idx as i64,
        })
        .collect()
}

/// Every `*.pdf` directly inside `dir`, sorted by path
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(EvalError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("PDF directory not found: {}", dir.display()),
        )));
    }

    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if path.is_file() && is_pdf {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Ingest every PDF in `pdf_dir`, optionally dropping the collection first
pub async fn ingest_pdf_dir(
    store: &QdrantStore,
    pdf_dir: &Path,
    reset: bool,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<usize> {
    let pdfs = list_pdfs(pdf_dir)?;
    let splitter = TextSplitter::new(chunk_size, chunk_overlap)?;

    if reset {
        store.reset().await?;
    }

    let mut total = 0;
    for pdf in &pdfs {
        let file_name = pdf
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = extract_pdf_text(pdf).await?;
        let drafts = chunk_document(&file_name, &text, &splitter);
        debug!(file = %file_name, chunks = drafts.len(), "chunked document");

        if drafts.is_empty() {
            continue;
        }
        total += store.upsert(&drafts).await?;
    }

    info!(
        dir = %pdf_dir.display(),
        documents = pdfs.len(),
        chunks = total,
        chunk_size,
        chunk_overlap,
        "ingested PDFs"
    );
    Ok(total)
}

/// Rebuilds the Qdrant collection from a PDF directory
pub struct PdfIndexBuilder {
    store: Arc<QdrantStore>,
    pdf_dir: PathBuf,
}

impl PdfIndexBuilder {
    pub fn new(store: Arc<QdrantStore>, pdf_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            pdf_dir: pdf_dir.into(),
        }
    }
}

#[async_trait]
impl IndexBuilder for PdfIndexBuilder {
    async fn rebuild(&self, chunk_size: usize, chunk_overlap: usize) -> Result<usize> {
        ingest_pdf_dir(&self.store, &self.pdf_dir, true, chunk_size, chunk_overlap).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_join_pages_drops_blank_pages() {
        let raw = "Page one\u{000C}   \u{000C}Page\u{0000} three\u{000C}";
        assert_eq!(join_pages(raw), "Page one\nPage three");
    }

    #[test]
    fn test_chunk_ids_follow_file_name() {
        let splitter = TextSplitter::new(20, 5).unwrap();
        let drafts = chunk_document(
            "gdpr.pdf",
            "Article 1 Subject matter.\n\nArticle 2 Material scope.",
            &splitter,
        );
        assert!(drafts.len() >= 2);
        for (idx, draft) in drafts.iter().enumerate() {
            assert_eq!(draft.id, format!("gdpr.pdf-{}", idx));
            assert_eq!(draft.chunk_index, idx as i64);
            assert_eq!(draft.source, "gdpr.pdf");
        }
    }

    #[test]
    fn test_list_pdfs_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let pdfs = list_pdfs(dir.path()).unwrap();
        let names: Vec<_> = pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_list_pdfs_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_pdfs(&dir.path().join("absent")).is_err());
    }
}
