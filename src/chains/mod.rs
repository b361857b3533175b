//! Conversational Answer Chains
//!
//! The three non-reflective strategies: plain retrieval with question
//! condensation, hypothetical-document retrieval (HyDE), and query
//! expansion. Each chain prepares a grounded answer prompt; callers either
//! complete it whole or stream it token by token.

pub mod prompts;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::ai::provider::{SharedModel, TokenStream};
use crate::retrieval::SharedRetriever;
use crate::types::{Result, ScoredChunk};

use self::prompts::{
    build_answer_prompt, build_condense_prompt, build_expansion_prompt, build_hyde_prompt,
};

/// Leading list markers on expansion output lines ("1. ", "- ", "* ")
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+[.)]\s*|[-*]\s*)").expect("valid regex"));

/// Retrieval strategy for a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Condense the question against chat history, then retrieve
    Base,
    /// Retrieve with a hypothetical answer passage
    Hyde,
    /// Retrieve with several rephrasings and merge the results
    QueryAug,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Hyde => "hyde",
            Self::QueryAug => "query_aug",
        }
    }
}

/// A grounded answer prompt ready for completion, plus its sources
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub prompt: String,
    pub sources: Vec<ScoredChunk>,
}

/// A completed chain answer
#[derive(Debug, Clone)]
pub struct ChainAnswer {
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

/// One conversational RAG chain
pub struct RagChain {
    model: SharedModel,
    retriever: SharedRetriever,
    strategy: Strategy,
}

impl RagChain {
    pub fn new(model: SharedModel, retriever: SharedRetriever, strategy: Strategy) -> Self {
        Self {
            model,
            retriever,
            strategy,
        }
    }

    /// Run the strategy's retrieval work and build the grounded answer prompt
    pub async fn prepare(&self, question: &str, history: &str) -> Result<PreparedPrompt> {
        match self.strategy {
            Strategy::Base => {
                let standalone = if history.trim().is_empty() {
                    question.to_string()
                } else {
                    self.model
                        .complete(&build_condense_prompt(history, question))
                        .await?
                        .trim()
                        .to_string()
                };
                debug!(standalone = %standalone, "condensed question");

                let sources = self.retriever.get_relevant(&standalone).await?;
                Ok(PreparedPrompt {
                    prompt: build_answer_prompt(&combine_documents(&sources), &standalone),
                    sources,
                })
            }
            Strategy::Hyde => {
                let hypothetical = self
                    .model
                    .complete(&build_hyde_prompt(history, question))
                    .await?;

                let sources = self.retriever.get_relevant(hypothetical.trim()).await?;
                Ok(PreparedPrompt {
                    prompt: build_answer_prompt(&combine_documents(&sources), question),
                    sources,
                })
            }
            Strategy::QueryAug => {
                let raw = self
                    .model
                    .complete(&build_expansion_prompt(question))
                    .await?;
                let variants = parse_query_variants(&raw, question);
                debug!(count = variants.len(), "expanded query variants");

                let mut sources: Vec<ScoredChunk> = Vec::new();
                for variant in &variants {
                    for scored in self.retriever.get_relevant(variant).await? {
                        if !sources.iter().any(|s| s.chunk.id == scored.chunk.id) {
                            sources.push(scored);
                        }
                    }
                }

                Ok(PreparedPrompt {
                    prompt: build_answer_prompt(&combine_documents(&sources), question),
                    sources,
                })
            }
        }
    }

    /// Prepare and complete in one call
    pub async fn answer(&self, question: &str, history: &str) -> Result<ChainAnswer> {
        let prepared = self.prepare(question, history).await?;
        let answer = self.model.complete(&prepared.prompt).await?;
        Ok(ChainAnswer {
            answer,
            sources: prepared.sources,
        })
    }

    /// Prepare and stream the final completion token by token
    pub async fn answer_stream(
        &self,
        question: &str,
        history: &str,
    ) -> Result<(TokenStream, Vec<ScoredChunk>)> {
        let prepared = self.prepare(question, history).await?;
        let stream = self.model.complete_stream(&prepared.prompt).await?;
        Ok((stream, prepared.sources))
    }
}

/// Join retrieved chunk texts for the answer prompt
fn combine_documents(sources: &[ScoredChunk]) -> String {
    sources
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse expansion output into distinct query variants, always including
/// the original question first.
fn parse_query_variants(raw: &str, original: &str) -> Vec<String> {
    let mut variants = vec![original.to_string()];

    for line in raw.lines() {
        let cleaned = LIST_MARKER.replace(line, "").trim().to_string();
        if !cleaned.is_empty() && !variants.iter().any(|v| v.eq_ignore_ascii_case(&cleaned)) {
            variants.push(cleaned);
        }
    }

    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedRetriever, ScriptedModel};
    use std::sync::Arc;

    #[test]
    fn test_parse_query_variants_strips_markers_and_dedupes() {
        let raw = "1. When are applications due?\n- Application deadline dates\n\nWhen are applications due?";
        let variants = parse_query_variants(raw, "deadline?");
        assert_eq!(
            variants,
            vec![
                "deadline?",
                "When are applications due?",
                "Application deadline dates"
            ]
        );
    }

    #[tokio::test]
    async fn test_base_chain_skips_condensing_without_history() {
        let model = Arc::new(
            ScriptedModel::new().on("Answer:", "the deadline is June 1"),
        );
        let retriever = Arc::new(FixedRetriever::new(&["deadline is June 1"]));
        let chain = RagChain::new(model.clone(), retriever, Strategy::Base);

        let result = chain.answer("when is the deadline?", "").await.unwrap();
        assert_eq!(result.answer, "the deadline is June 1");
        assert_eq!(result.sources.len(), 1);
        assert_eq!(model.prompts_containing("Standalone question:"), 0);
    }

    #[tokio::test]
    async fn test_base_chain_condenses_with_history() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("Standalone question:", "When is the spring deadline?")
                .on("Answer:", "November 1"),
        );
        let retriever = Arc::new(FixedRetriever::new(&["spring deadline is November 1"]));
        let chain = RagChain::new(model.clone(), retriever, Strategy::Base);

        let result = chain
            .answer("what about spring?", "Student: when is the fall deadline?\nAssistant: June 1")
            .await
            .unwrap();

        assert_eq!(result.answer, "November 1");
        assert_eq!(model.prompts_containing("Standalone question:"), 1);
        // the condensed question feeds the answer prompt
        assert_eq!(
            model.prompts_containing("Question: When is the spring deadline?"),
            1
        );
    }

    #[tokio::test]
    async fn test_hyde_chain_retrieves_with_hypothetical_passage() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("Passage:", "Orientation takes place in late August.")
                .on("Answer:", "late August"),
        );
        let retriever = Arc::new(FixedRetriever::new(&["orientation info"]));
        let chain = RagChain::new(model.clone(), retriever.clone(), Strategy::Hyde);

        let result = chain.answer("when is orientation?", "").await.unwrap();
        assert_eq!(result.answer, "late August");
        assert_eq!(retriever.call_count(), 1);
        // the answer prompt keeps the original question
        assert_eq!(model.prompts_containing("Question: when is orientation?"), 1);
    }

    #[tokio::test]
    async fn test_query_aug_chain_retrieves_per_variant() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("query expansion", "1. variant one\n2. variant two")
                .on("Answer:", "merged answer"),
        );
        let retriever = Arc::new(FixedRetriever::new(&["chunk"]));
        let chain = RagChain::new(model, retriever.clone(), Strategy::QueryAug);

        let result = chain.answer("original?", "").await.unwrap();
        assert_eq!(result.answer, "merged answer");
        // original + 2 variants
        assert_eq!(retriever.call_count(), 3);
        // duplicates are merged by chunk id
        assert_eq!(result.sources.len(), 1);
    }
}
