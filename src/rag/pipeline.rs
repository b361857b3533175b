//! Reflective Query Pipeline
//!
//! Orchestrates the full self-reflective answer flow: decompose the user's
//! question into sub-queries, answer each one (retrieval or direct
//! generation), critique the answer, escalate to web search when quality is
//! too low, and consolidate everything into one final answer.
//!
//! Sub-queries are processed strictly in order, one at a time; every
//! collaborator call blocks the pipeline until it returns. Each sub-query
//! escalates at most once, regardless of its re-critique score.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ai::parse::parse_string_list;
use crate::ai::provider::SharedModel;
use crate::retrieval::Retriever;
use crate::search::SearchClient;
use crate::types::{BuddyError, Result};

use super::consolidate::Consolidator;
use super::decider::RetrievalDecider;
use super::judge::Judge;
use super::planner::QueryPlanner;
use super::prompts::build_direct_answer_prompt;
use super::subquery::SubQuery;

/// Self-reflective pipeline controller
pub struct QueryPipeline {
    model: SharedModel,
    retriever: Arc<dyn Retriever>,
    search: Arc<dyn SearchClient>,
    planner: QueryPlanner,
    decider: RetrievalDecider,
    judge: Judge,
    consolidator: Consolidator,
}

impl QueryPipeline {
    pub fn new(
        model: SharedModel,
        retriever: Arc<dyn Retriever>,
        search: Arc<dyn SearchClient>,
    ) -> Self {
        Self {
            planner: QueryPlanner::new(model.clone()),
            decider: RetrievalDecider::new(model.clone()),
            judge: Judge::new(model.clone()),
            consolidator: Consolidator::new(model.clone()),
            model,
            retriever,
            search,
        }
    }

    /// Answer `question` through the reflective pipeline.
    ///
    /// A planning parse failure aborts the run; an evaluation parse failure
    /// propagates; a search parse failure degrades to empty results.
    pub async fn run(&self, question: &str, subquery_count: usize) -> Result<String> {
        let questions = self
            .planner
            .generate_subqueries(question, subquery_count)
            .await?;
        info!(count = questions.len(), "planned sub-queries");

        let mut subqueries: Vec<SubQuery> = questions.into_iter().map(SubQuery::new).collect();

        for sub in &mut subqueries {
            self.answer(sub).await?;
            self.critique(sub).await?;

            if sub.search_needed {
                debug!(query = %sub.query, score = sub.critique_score, "escalating to web search");
                self.escalate(sub).await?;
            }
        }

        let combined = subqueries
            .iter()
            .flat_map(|sub| sub.content.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");

        self.consolidator.consolidate(&[combined]).await
    }

    /// Produce the initial content for a sub-query: retrieved chunks when
    /// the decider says retrieval is needed, a direct model answer otherwise.
    async fn answer(&self, sub: &mut SubQuery) -> Result<()> {
        if self.decider.needs_retrieval(&sub.query).await? {
            let chunks = self.retriever.get_relevant(&sub.query).await?;
            let response = chunks
                .iter()
                .map(|scored| scored.chunk.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            sub.retrieval_needed = true;
            sub.content.push(response);
        } else {
            let response = self
                .model
                .complete(&build_direct_answer_prompt(&sub.query))
                .await?;
            sub.retrieval_needed = false;
            sub.content.push(response);
        }
        Ok(())
    }

    async fn critique(&self, sub: &mut SubQuery) -> Result<()> {
        let critique = self.judge.critique(&sub.query, &sub.joined_content()).await?;
        sub.record_critique(critique);
        Ok(())
    }

    /// One-shot escalation: search, append parsed results, consolidate the
    /// accumulated fragments, and re-critique the merged text.
    async fn escalate(&self, sub: &mut SubQuery) -> Result<()> {
        let raw = self.search.run(&sub.query).await?;

        let results = match parse_string_list(&raw) {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %BuddyError::SearchParse(e.to_string()), "continuing with empty search results");
                Vec::new()
            }
        };
        sub.content.extend(results);

        let merged = self.consolidator.consolidate(&sub.content).await?;
        sub.replace_with_consolidated(merged);

        self.critique(sub).await
    }
}
