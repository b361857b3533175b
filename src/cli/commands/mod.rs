//! CLI Commands

pub mod ask;
pub mod chat;
pub mod config;
pub mod eval;
pub mod ingest;
pub mod init;

use std::sync::Arc;

use crate::config::{Config, ConfigLoader};
use crate::retrieval::{ChunkStore, OpenAiEmbedder, SharedRetriever, SharedStore, StoreRetriever};
use crate::search::DuckDuckGoClient;
use crate::types::{BuddyError, Result};

/// Open the project chunk store, requiring prior `init`
pub(crate) fn open_store() -> Result<SharedStore> {
    if !ConfigLoader::is_project_initialized() {
        return Err(BuddyError::NotInitialized);
    }
    Ok(Arc::new(ChunkStore::open(&ConfigLoader::store_path())?))
}

/// Build the retriever stack: store + embedder + top-k
pub(crate) fn build_retriever(config: &Config, store: SharedStore) -> Result<SharedRetriever> {
    let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding, &config.llm)?);
    Ok(Arc::new(StoreRetriever::new(
        store,
        embedder,
        config.retrieval.top_k,
    )))
}

/// Build the web search client
pub(crate) fn build_search(config: &Config) -> Result<Arc<DuckDuckGoClient>> {
    Ok(Arc::new(DuckDuckGoClient::new(config.search.max_results)?))
}
