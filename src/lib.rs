//! Bull Buddy - Retrieval-Augmented Assistant for University Program Q&A
//!
//! A chat assistant that answers student questions about a university
//! program from an embedded document index, with a self-reflective answer
//! pipeline: questions are decomposed into sub-queries, each answer is
//! critiqued along five quality dimensions, and low-quality answers
//! escalate to live web search before consolidation.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use bullbuddy::ai::provider::create_model;
//! use bullbuddy::rag::QueryPipeline;
//! use bullbuddy::retrieval::{ChunkStore, OpenAiEmbedder, StoreRetriever};
//! use bullbuddy::search::DuckDuckGoClient;
//!
//! let model = create_model(&config.llm)?;
//! let store = Arc::new(ChunkStore::open("chunks.db".as_ref())?);
//! let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding, &config.llm)?);
//! let retriever = Arc::new(StoreRetriever::new(store, embedder, 5));
//! let search = Arc::new(DuckDuckGoClient::new(5)?);
//!
//! let pipeline = QueryPipeline::new(model, retriever, search);
//! let answer = pipeline.run("What are the admission deadlines?", 3).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: LLM provider abstraction, response parsing, token estimation
//! - [`rag`]: the self-reflective pipeline (planner, judge, decider, consolidator)
//! - [`chains`]: conversational strategies (base, HyDE, query expansion)
//! - [`retrieval`]: embeddings and the SQLite chunk store
//! - [`ingest`]: document loading and chunking
//! - [`search`]: web search escalation client
//! - [`memory`]: summary-buffer conversation memory
//! - [`evals`]: strategy evaluation harness

pub mod ai;
pub mod chains;
pub mod cli;
pub mod config;
pub mod constants;
pub mod evals;
pub mod ingest;
pub mod memory;
pub mod rag;
pub mod retrieval;
pub mod search;
pub mod types;

#[cfg(test)]
pub mod test_support;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{BuddyError, Result};

// Pipeline
pub use rag::{Critique, Judge, QueryPipeline, QueryPlanner, RetrievalDecider, SubQuery};

// Collaborator seams
pub use ai::provider::{ChatModel, SharedModel, create_model};
pub use retrieval::{Retriever, SharedRetriever};
pub use search::SearchClient;
