//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Failure semantics
//!
//! The reflective pipeline distinguishes three parse failures:
//!
//! - `EvaluationParse`: a rubric score response was not a number — fatal,
//!   propagated to the caller of `critique`.
//! - `QueryGenerationParse`: sub-query planning output was not parseable —
//!   fatal, aborts the whole run.
//! - `SearchParse`: web search results were not parseable — recovered at the
//!   call site by substituting an empty result list.
//!
//! Collaborator errors (HTTP, database) propagate unchanged; retry policy
//! lives in the provider clients, not here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuddyError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    // -------------------------------------------------------------------------
    // Pipeline Parse Errors
    // -------------------------------------------------------------------------
    /// A rubric score response was not a parseable number. Fatal for the
    /// evaluation call; never silently defaulted.
    #[error("unparseable {dimension} score from model: {raw:?}")]
    EvaluationParse { dimension: String, raw: String },

    /// Sub-query planning output could not be parsed as structured data.
    /// Aborts the whole pipeline run.
    #[error("unparseable sub-query planning response: {0}")]
    QueryGenerationParse(String),

    /// Web search results could not be parsed as a structured list.
    /// Recovered locally with an empty result list.
    #[error("unparseable search results: {0}")]
    SearchParse(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Ingest error in {path}: {message}")]
    Ingest { path: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Evaluation error: {0}")]
    Eval(String),

    #[error("Not initialized: run 'bullbuddy init' first")]
    NotInitialized,
}

impl BuddyError {
    /// Create an ingest error with path context
    pub fn ingest(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check whether a provider request error is worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::LlmApi(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("429")
                    || lower.contains("rate limit")
                    || lower.contains("overloaded")
                    || lower.contains("500")
                    || lower.contains("502")
                    || lower.contains("503")
            }
            _ => false,
        }
    }
}

impl From<anyhow::Error> for BuddyError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(db_err) = err.downcast_ref::<rusqlite::Error>() {
            return BuddyError::Storage(db_err.to_string());
        }
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return BuddyError::Io(std::io::Error::new(io_err.kind(), io_err.to_string()));
        }
        BuddyError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BuddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_parse_display() {
        let err = BuddyError::EvaluationParse {
            dimension: "relevance".to_string(),
            raw: "very relevant".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unparseable relevance score from model: \"very relevant\""
        );
    }

    #[test]
    fn test_query_generation_parse_display() {
        let err = BuddyError::QueryGenerationParse("not json".to_string());
        assert!(err.to_string().contains("sub-query planning"));
    }

    #[test]
    fn test_llm_api_transient_classification() {
        assert!(BuddyError::LlmApi("HTTP 429 rate limit exceeded".into()).is_transient());
        assert!(BuddyError::LlmApi("server overloaded, retry later".into()).is_transient());
        assert!(!BuddyError::LlmApi("invalid api key".into()).is_transient());
        assert!(!BuddyError::Config("bad temperature".into()).is_transient());
    }

    #[test]
    fn test_ingest_helper() {
        let err = BuddyError::ingest("data/faq.pdf", "empty file");
        assert_eq!(err.to_string(), "Ingest error in data/faq.pdf: empty file");
    }

    #[test]
    fn test_anyhow_conversion_defaults_to_storage() {
        let err: BuddyError = anyhow::anyhow!("pool exhausted").into();
        assert!(matches!(err, BuddyError::Storage(_)));
    }
}
