//! Fragment Consolidation
//!
//! Merges a set of text fragments into one coherent passage via a single
//! model call. The model's response is returned verbatim; no validation.

use crate::ai::provider::SharedModel;
use crate::types::Result;

use super::prompts::build_consolidation_prompt;

/// LLM-backed text merger
pub struct Consolidator {
    model: SharedModel,
}

impl Consolidator {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    /// Merge `fragments` into a single passage
    pub async fn consolidate(&self, fragments: &[String]) -> Result<String> {
        self.model
            .complete(&build_consolidation_prompt(fragments))
            .await
    }
}
