//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/bullbuddy/) and project (.bullbuddy/) level
//! configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// LLM provider settings
    pub llm: LlmConfig,

    /// Embedding provider settings
    pub embedding: EmbeddingConfig,

    /// Retrieval settings
    pub retrieval: RetrievalConfig,

    /// Reflective pipeline settings
    pub pipeline: PipelineConfig,

    /// Document ingestion settings
    pub ingest: IngestConfig,

    /// Conversation memory settings
    pub memory: MemoryConfig,

    /// Web search settings
    pub search: SearchConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `BuddyError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(crate::types::BuddyError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(crate::types::BuddyError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.subqueries == 0 {
            return Err(crate::types::BuddyError::Config(
                "pipeline.subqueries must be greater than 0".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(crate::types::BuddyError::Config(
                "retrieval.top_k must be greater than 0".to_string(),
            ));
        }

        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(crate::types::BuddyError::Config(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type: "openai", "ollama"
    pub provider: String,

    /// Model name (provider-specific)
    pub model: String,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// API key. Never serialized back out; usually supplied via
    /// OPENAI_API_KEY instead.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Temperature for generation (0.0 = deterministic)
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens to generate per response
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_base: None,
            api_key: None,
            temperature: 0.0,
            timeout_secs: constants::network::DEFAULT_TIMEOUT_SECS,
            max_tokens: 1024,
        }
    }
}

// =============================================================================
// Embedding Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,

    /// API base URL (defaults to the LLM provider's base)
    pub api_base: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            api_base: None,
        }
    }
}

// =============================================================================
// Retrieval Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks returned per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: constants::retrieval::DEFAULT_TOP_K,
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of sub-queries generated per user question
    pub subqueries: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            subqueries: constants::pipeline::DEFAULT_SUBQUERY_COUNT,
        }
    }
}

// =============================================================================
// Ingest Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory scanned for documents
    pub data_dir: String,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            chunk_size: constants::ingest::DEFAULT_CHUNK_SIZE,
            chunk_overlap: constants::ingest::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

// =============================================================================
// Memory Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Token budget for verbatim history before summarization
    pub max_tokens: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_tokens: constants::memory::DEFAULT_MAX_TOKENS,
        }
    }
}

// =============================================================================
// Search Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of web search results per query
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: constants::search::DEFAULT_MAX_RESULTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_subqueries_rejected() {
        let mut config = Config::default();
        config.pipeline.subqueries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut config = Config::default();
        config.ingest.chunk_size = 100;
        config.ingest.chunk_overlap = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("sk-secret"));
    }
}
