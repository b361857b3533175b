//! Retrieval Necessity Decision
//!
//! Asks the model whether a question needs document retrieval at all. The
//! decision is decoded strictly: only an affirmative "True" (modulo case,
//! whitespace, and trailing punctuation) counts; any other phrasing decodes
//! as false and is logged for diagnosis, since an unexpected response would
//! otherwise silently skip retrieval.

use tracing::debug;

use crate::ai::provider::SharedModel;
use crate::types::Result;

use super::prompts::build_retrieval_decision_prompt;

/// LLM-backed binary retrieval decision
pub struct RetrievalDecider {
    model: SharedModel,
}

impl RetrievalDecider {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    /// Decide whether `query` requires retrieval from the document store
    pub async fn needs_retrieval(&self, query: &str) -> Result<bool> {
        let raw = self
            .model
            .complete(&build_retrieval_decision_prompt(query))
            .await?;

        let decision = decode_affirmative(&raw);
        if !decision {
            debug!(response = %raw.trim(), "retrieval decision decoded as false");
        }
        Ok(decision)
    }
}

/// Strict affirmative decoding: trimmed, case-insensitive "true" with
/// trailing sentence punctuation tolerated. Everything else is false.
pub fn decode_affirmative(raw: &str) -> bool {
    raw.trim()
        .trim_end_matches(['.', '!'])
        .eq_ignore_ascii_case("true")
}
