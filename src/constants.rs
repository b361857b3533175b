//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Self-reflective pipeline constants
pub mod pipeline {
    /// Weighted critique score below which a sub-query escalates to web search
    pub const SEARCH_ESCALATION_THRESHOLD: f64 = 0.5;

    /// Default number of sub-queries generated per user question
    pub const DEFAULT_SUBQUERY_COUNT: usize = 3;
}

/// Critique rubric weights
///
/// Each generated answer is scored on five dimensions; the weighted average
/// of the dimension scores is the overall critique score.
pub mod critique {
    /// Weight for the relevance dimension
    pub const RELEVANCE_WEIGHT: f64 = 3.0;

    /// Weight for the clarity dimension
    pub const CLARITY_WEIGHT: f64 = 1.0;

    /// Weight for the coherence dimension
    pub const COHERENCE_WEIGHT: f64 = 0.5;

    /// Weight for the details dimension
    pub const DETAILS_WEIGHT: f64 = 1.5;

    /// Weight for the suitability dimension
    pub const SUITABILITY_WEIGHT: f64 = 2.0;
}

/// Retrieval constants
pub mod retrieval {
    /// Default number of chunks returned per query
    pub const DEFAULT_TOP_K: usize = 5;

    /// Batch size for embedding requests during ingestion
    pub const EMBEDDING_BATCH_SIZE: usize = 64;
}

/// Document ingestion constants
pub mod ingest {
    /// Default chunk size in characters
    pub const DEFAULT_CHUNK_SIZE: usize = 500;

    /// Default overlap between adjacent chunks in characters
    pub const DEFAULT_CHUNK_OVERLAP: usize = 150;
}

/// Conversation memory constants
pub mod memory {
    /// Token budget for verbatim chat history before summarization kicks in
    pub const DEFAULT_MAX_TOKENS: usize = 2000;
}

/// Web search constants
pub mod search {
    /// Maximum number of search results returned per query
    pub const DEFAULT_MAX_RESULTS: usize = 5;

    /// Search request timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;
}

/// HTTP/Network constants
pub mod network {
    /// Default LLM request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;

    /// Maximum retries for provider requests
    pub const MAX_PROVIDER_RETRIES: usize = 3;
}
