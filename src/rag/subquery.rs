//! Sub-Query State
//!
//! One decomposed question and everything accumulated while answering it.
//! Owned exclusively by the pipeline for the duration of a run; nothing is
//! persisted.

use std::collections::HashMap;

use crate::constants::pipeline::SEARCH_ESCALATION_THRESHOLD;

use super::judge::Critique;

/// One decomposed question moving through the pipeline.
///
/// `content` is append-only until a search escalation consolidates it down
/// to a single merged fragment; that transition happens at most once.
#[derive(Debug, Clone, Default)]
pub struct SubQuery {
    /// The sub-question text, fixed at construction
    pub query: String,
    /// Generated, retrieved, and searched text fragments
    pub content: Vec<String>,
    /// Weighted quality score from the most recent critique
    pub critique_score: f64,
    /// Per-dimension scores from the most recent critique
    pub critique_details: HashMap<String, f64>,
    /// Which branch produced the initial content
    pub retrieval_needed: bool,
    /// Whether the most recent critique fell below the escalation threshold
    pub search_needed: bool,
}

impl SubQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// All fragments joined for critique
    pub fn joined_content(&self) -> String {
        self.content.join("\n")
    }

    /// Record a critique outcome. `search_needed` is recomputed here and
    /// nowhere else, so it always reflects the most recent score.
    pub fn record_critique(&mut self, critique: Critique) {
        self.critique_score = critique.weighted_score;
        self.critique_details = critique.details;
        self.search_needed = self.critique_score < SEARCH_ESCALATION_THRESHOLD;
    }

    /// Replace accumulated fragments with their consolidated form
    pub fn replace_with_consolidated(&mut self, merged: String) {
        self.content = vec![merged];
    }
}
