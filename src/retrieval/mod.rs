//! Retrieval Layer
//!
//! The `Retriever` trait is the pipeline's only view of retrieval: give it a
//! query, get back the most similar chunks. The concrete implementation
//! embeds the query and runs a cosine top-k scan over the SQLite chunk
//! store.

pub mod embedder;
pub mod store;

pub use embedder::{Embedder, OpenAiEmbedder, SharedEmbedder};
pub use store::{ChunkStore, SharedStore, cosine_similarity};

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{Result, ScoredChunk};

/// Nearest-neighbor search over the embedded document index
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return the chunks most relevant to `query`, best first
    async fn get_relevant(&self, query: &str) -> Result<Vec<ScoredChunk>>;
}

/// Retriever backed by the chunk store and an embedding provider
pub struct StoreRetriever {
    store: SharedStore,
    embedder: SharedEmbedder,
    top_k: usize,
}

impl StoreRetriever {
    pub fn new(store: SharedStore, embedder: SharedEmbedder, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            top_k,
        }
    }
}

#[async_trait]
impl Retriever for StoreRetriever {
    async fn get_relevant(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embedder.embed_one(query).await?;
        self.store.nearest(&embedding, self.top_k)
    }
}

/// Shared retriever handle for the pipeline
pub type SharedRetriever = Arc<dyn Retriever>;
