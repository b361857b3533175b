//! Document Ingestion
//!
//! Walks the data directory, extracts text from supported formats, splits
//! it into chunks, embeds the chunks, and writes everything to the chunk
//! store. Files whose content hash is unchanged since the last run are
//! skipped.

pub mod loader;
pub mod splitter;

pub use loader::{SourceFormat, detect_format, load_file};
pub use splitter::TextSplitter;

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::IngestConfig;
use crate::constants::retrieval::EMBEDDING_BATCH_SIZE;
use crate::retrieval::{SharedEmbedder, SharedStore};
use crate::types::{Chunk, ChunkMetadata, Document, Result};

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestStats {
    /// Documents (re)ingested
    pub documents: usize,
    /// Chunks embedded and stored
    pub chunks: usize,
    /// Files skipped because their content was unchanged
    pub skipped: usize,
}

/// Ingestion driver
pub struct Ingestor {
    store: SharedStore,
    embedder: SharedEmbedder,
    splitter: TextSplitter,
}

impl Ingestor {
    pub fn new(store: SharedStore, embedder: SharedEmbedder, config: &IngestConfig) -> Self {
        Self {
            store,
            embedder,
            splitter: TextSplitter::new(config.chunk_size, config.chunk_overlap),
        }
    }

    /// Ingest every supported file under `data_dir`
    pub async fn run(&self, data_dir: &Path) -> Result<IngestStats> {
        let mut stats = IngestStats::default();

        for path in scan_documents(data_dir) {
            let Some(format) = detect_format(&path) else {
                debug!(path = %path.display(), "skipping unsupported file");
                continue;
            };

            let rel_path = path
                .strip_prefix(data_dir)
                .unwrap_or(&path)
                .display()
                .to_string();

            let raw = std::fs::read(&path)?;
            let content_hash = hex_digest(&raw);

            if self.store.document_hash(&rel_path)?.as_deref() == Some(content_hash.as_str()) {
                debug!(path = %rel_path, "unchanged, skipping");
                stats.skipped += 1;
                continue;
            }

            let pages = match load_file(&path, format) {
                Ok(pages) => pages,
                Err(e) => {
                    warn!(path = %rel_path, error = %e, "failed to extract text, skipping");
                    continue;
                }
            };

            let doc = Document {
                id: Uuid::new_v4().to_string(),
                path: rel_path.clone(),
                content_hash,
                pages,
            };

            let chunk_count = self.ingest_document(&doc).await?;
            info!(path = %rel_path, chunks = chunk_count, "ingested");
            stats.documents += 1;
            stats.chunks += chunk_count;
        }

        Ok(stats)
    }

    /// Split, embed, and store one document; returns the chunk count
    async fn ingest_document(&self, doc: &Document) -> Result<usize> {
        let has_pages = doc.pages.len() > 1;
        let mut chunks: Vec<Chunk> = Vec::new();

        for (page_idx, page) in doc.pages.iter().enumerate() {
            for text in self.splitter.split(page) {
                let ordinal = chunks.len();
                chunks.push(Chunk {
                    id: format!("{}-{}", &doc.content_hash[..12.min(doc.content_hash.len())], ordinal),
                    text,
                    metadata: ChunkMetadata {
                        source: doc.path.clone(),
                        page: has_pages.then_some(page_idx + 1),
                        ordinal,
                    },
                });
            }
        }

        let mut embedded: Vec<(Chunk, Vec<f32>)> = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBEDDING_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed(&texts).await?;
            embedded.extend(batch.iter().cloned().zip(embeddings));
        }

        self.store.insert_document(doc, &embedded)?;
        Ok(embedded.len())
    }
}

/// Recursively list candidate files under `dir`, in stable order
fn scan_documents(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
        .hidden(true)
        .git_ignore(false)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{ChunkStore, Embedder};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Deterministic local embedder for tests
    struct HashEmbedder;

    #[async_trait]
    impl Embedder for HashEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, t.chars().filter(|c| *c == 'e').count() as f32])
                .collect())
        }
    }

    fn test_config() -> IngestConfig {
        IngestConfig {
            data_dir: "data".to_string(),
            chunk_size: 80,
            chunk_overlap: 20,
        }
    }

    #[tokio::test]
    async fn test_ingest_directory() {
        let data_dir = TempDir::new().unwrap();
        std::fs::write(
            data_dir.path().join("faq.md"),
            "Admission deadlines are June 1 for fall and November 1 for spring.",
        )
        .unwrap();
        std::fs::write(
            data_dir.path().join("catalog.json"),
            r#"{"course": "Data Mining", "credits": "3 credit hours"}"#,
        )
        .unwrap();
        std::fs::write(data_dir.path().join("ignore.bin"), b"\x00\x01").unwrap();

        let store_dir = TempDir::new().unwrap();
        let store = Arc::new(ChunkStore::open(&store_dir.path().join("chunks.db")).unwrap());
        let ingestor = Ingestor::new(store.clone(), Arc::new(HashEmbedder), &test_config());

        let stats = ingestor.run(data_dir.path()).await.unwrap();
        assert_eq!(stats.documents, 2);
        assert!(stats.chunks >= 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(store.document_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reingest_skips_unchanged_files() {
        let data_dir = TempDir::new().unwrap();
        std::fs::write(data_dir.path().join("faq.txt"), "orientation is in August").unwrap();

        let store_dir = TempDir::new().unwrap();
        let store = Arc::new(ChunkStore::open(&store_dir.path().join("chunks.db")).unwrap());
        let ingestor = Ingestor::new(store.clone(), Arc::new(HashEmbedder), &test_config());

        let first = ingestor.run(data_dir.path()).await.unwrap();
        assert_eq!(first.documents, 1);

        let second = ingestor.run(data_dir.path()).await.unwrap();
        assert_eq!(second.documents, 0);
        assert_eq!(second.skipped, 1);

        // changed content is re-ingested
        std::fs::write(data_dir.path().join("faq.txt"), "orientation moved to September").unwrap();
        let third = ingestor.run(data_dir.path()).await.unwrap();
        assert_eq!(third.documents, 1);
        assert_eq!(store.document_count().unwrap(), 1);
    }
}
