//! Document and Chunk Types
//!
//! Core data types shared between ingestion, storage, and retrieval.

use serde::{Deserialize, Serialize};

/// A source document loaded during ingestion, before splitting.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable document id (UUID v4)
    pub id: String,
    /// Path of the source file, relative to the data directory when possible
    pub path: String,
    /// SHA-256 hex digest of the raw file contents, used to skip re-ingestion
    pub content_hash: String,
    /// Extracted text, one entry per page (single entry for unpaged formats)
    pub pages: Vec<String>,
}

impl Document {
    /// Total extracted text length in characters
    pub fn text_len(&self) -> usize {
        self.pages.iter().map(|p| p.chars().count()).sum()
    }
}

/// One embedded text chunk stored in the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Stable chunk id (content-hash derived)
    pub id: String,
    /// Chunk text as fed to the embedder
    pub text: String,
    /// Source metadata carried through retrieval
    pub metadata: ChunkMetadata,
}

/// Provenance metadata for a chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChunkMetadata {
    /// Source file path
    pub source: String,
    /// Page number within the source, when the format has pages
    pub page: Option<usize>,
    /// Position of this chunk within its document's chunk sequence
    pub ordinal: usize,
}

/// A chunk paired with its similarity score for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity in [-1, 1]; higher is closer
    pub score: f32,
}
