//! SQLite Chunk Store
//!
//! Persistent storage for ingested documents and their embedded chunks,
//! with connection pooling via r2d2 and WAL mode. Retrieval is an
//! exhaustive cosine scan over all stored embeddings; there is no
//! approximate index structure.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::types::{BuddyError, Chunk, ChunkMetadata, Document, Result, ScoredChunk};

/// Shared store handle for async contexts
pub type SharedStore = Arc<ChunkStore>;

const SCHEMA: &str = include_str!("schema.sql");

/// Maximum pooled connections; ingestion and retrieval are light users
const POOL_SIZE: u32 = 4;

/// SQLite-backed document and chunk storage
pub struct ChunkStore {
    pool: Pool<SqliteConnectionManager>,
}

impl ChunkStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA foreign_keys = ON;",
            )
        });

        let pool = Pool::builder()
            .max_size(POOL_SIZE)
            .build(manager)
            .map_err(|e| BuddyError::Storage(format!("Failed to create pool: {}", e)))?;

        let store = Self { pool };
        store.conn()?.execute_batch(SCHEMA)?;
        Ok(store)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| BuddyError::Storage(format!("Failed to acquire connection: {}", e)))
    }

    /// Content hash of an already-ingested document, if any
    pub fn document_hash(&self, path: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT content_hash FROM documents WHERE path = ?1")?;
        let mut rows = stmt.query(params![path])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Insert a document and its embedded chunks in one transaction,
    /// replacing any prior version of the same path.
    pub fn insert_document(&self, doc: &Document, chunks: &[(Chunk, Vec<f32>)]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // cascade removes the old chunks
        tx.execute("DELETE FROM documents WHERE path = ?1", params![doc.path])
            .context("delete prior document")?;

        tx.execute(
            "INSERT INTO documents (id, path, content_hash, ingested_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                doc.id,
                doc.path,
                doc.content_hash,
                chrono::Utc::now().to_rfc3339()
            ],
        )
        .context("insert document")?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO chunks (id, document_id, ordinal, page, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (chunk, embedding) in chunks {
                stmt.execute(params![
                    chunk.id,
                    doc.id,
                    chunk.metadata.ordinal,
                    chunk.metadata.page,
                    chunk.text,
                    embedding_to_blob(embedding),
                ])
                .context("insert chunk")?;
            }
        }

        tx.commit().context("commit ingest transaction")?;
        Ok(())
    }

    /// Exhaustive cosine top-k over every stored chunk, best first
    pub fn nearest(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.text, c.ordinal, c.page, c.embedding, d.path
             FROM chunks c JOIN documents d ON d.id = c.document_id",
        )?;

        let mut scored: Vec<ScoredChunk> = stmt
            .query_map([], |row| {
                let blob: Vec<u8> = row.get(4)?;
                Ok(ScoredChunk {
                    chunk: Chunk {
                        id: row.get(0)?,
                        text: row.get(1)?,
                        metadata: ChunkMetadata {
                            ordinal: row.get::<_, i64>(2)? as usize,
                            page: row.get::<_, Option<i64>>(3)?.map(|p| p as usize),
                            source: row.get(5)?,
                        },
                    },
                    score: cosine_similarity(embedding, &blob_to_embedding(&blob)),
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    pub fn document_count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn chunk_count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Serialize an embedding as little-endian f32 bytes
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Deserialize a little-endian f32 blob
fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}

/// Cosine similarity; zero-magnitude vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_doc(path: &str, hash: &str) -> Document {
        Document {
            id: uuid::Uuid::new_v4().to_string(),
            path: path.to_string(),
            content_hash: hash.to_string(),
            pages: vec![],
        }
    }

    fn test_chunk(id: &str, text: &str, ordinal: usize) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: text.to_string(),
            metadata: ChunkMetadata {
                source: String::new(),
                page: None,
                ordinal,
            },
        }
    }

    fn open_store(dir: &TempDir) -> ChunkStore {
        ChunkStore::open(&dir.path().join("chunks.db")).unwrap()
    }

    #[test]
    fn test_blob_roundtrip() {
        let embedding = vec![0.25f32, -1.5, 3.0];
        assert_eq!(blob_to_embedding(&embedding_to_blob(&embedding)), embedding);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_nearest_orders_by_similarity() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let doc = test_doc("faq.md", "hash-1");
        store
            .insert_document(
                &doc,
                &[
                    (test_chunk("c1", "deadlines", 0), vec![1.0, 0.0]),
                    (test_chunk("c2", "tuition", 1), vec![0.0, 1.0]),
                    (test_chunk("c3", "mixed", 2), vec![0.7, 0.7]),
                ],
            )
            .unwrap();

        let results = store.nearest(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "deadlines");
        assert_eq!(results[1].chunk.text, "mixed");
        assert_eq!(results[0].chunk.metadata.source, "faq.md");
    }

    #[test]
    fn test_reingest_replaces_chunks() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .insert_document(
                &test_doc("faq.md", "hash-1"),
                &[(test_chunk("c1", "old text", 0), vec![1.0])],
            )
            .unwrap();
        store
            .insert_document(
                &test_doc("faq.md", "hash-2"),
                &[(test_chunk("c2", "new text", 0), vec![1.0])],
            )
            .unwrap();

        assert_eq!(store.document_count().unwrap(), 1);
        assert_eq!(store.chunk_count().unwrap(), 1);
        assert_eq!(store.document_hash("faq.md").unwrap().as_deref(), Some("hash-2"));

        let results = store.nearest(&[1.0], 5).unwrap();
        assert_eq!(results[0].chunk.text, "new text");
    }

    #[test]
    fn test_document_hash_missing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert_eq!(store.document_hash("nope.md").unwrap(), None);
    }
}
