//! Sub-Query Planning
//!
//! Decomposes the user's question into better-articulated sub-questions via
//! one model call. The response must parse as a JSON object with a
//! `questions` array; the two-stage parser tolerates Python-style literals,
//! but an unparseable response is fatal for the whole run. Sub-queries are
//! never fabricated locally.

use serde_json::Value;
use tracing::debug;

use crate::ai::parse::parse_structured;
use crate::ai::provider::SharedModel;
use crate::types::{BuddyError, Result};

use super::prompts::build_subquery_prompt;

/// LLM-backed query decomposition
pub struct QueryPlanner {
    model: SharedModel,
}

impl QueryPlanner {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    /// Generate up to `count` rephrased sub-questions for `query`.
    ///
    /// The result is truncated to `count` when the model over-delivers; an
    /// empty or missing `questions` array is a `QueryGenerationParse` error.
    pub async fn generate_subqueries(&self, query: &str, count: usize) -> Result<Vec<String>> {
        let raw = self
            .model
            .complete(&build_subquery_prompt(query, count))
            .await?;

        let value = parse_structured(&raw)
            .map_err(|e| BuddyError::QueryGenerationParse(e.to_string()))?;

        let questions = value
            .get("questions")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                BuddyError::QueryGenerationParse(format!(
                    "missing \"questions\" array in: {}",
                    value
                ))
            })?;

        let mut subqueries: Vec<String> = questions
            .iter()
            .filter_map(|q| q.as_str())
            .map(str::to_string)
            .collect();

        if subqueries.is_empty() {
            return Err(BuddyError::QueryGenerationParse(
                "empty \"questions\" array".to_string(),
            ));
        }

        subqueries.truncate(count);
        debug!(count = subqueries.len(), "generated sub-queries");
        Ok(subqueries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_generate_subqueries_happy_path() {
        let model = Arc::new(
            ScriptedModel::new().on("better articulated", r#"{"questions": ["a", "b", "c"]}"#),
        );
        let planner = QueryPlanner::new(model);

        let subqueries = planner.generate_subqueries("deadlines?", 3).await.unwrap();
        assert_eq!(subqueries, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_malformed_response_is_fatal() {
        let model = Arc::new(ScriptedModel::new().on("better articulated", "not json"));
        let planner = QueryPlanner::new(model);

        let err = planner.generate_subqueries("deadlines?", 3).await.unwrap_err();
        assert!(matches!(err, BuddyError::QueryGenerationParse(_)));
    }

    #[tokio::test]
    async fn test_python_literal_fallback_accepted() {
        let model = Arc::new(
            ScriptedModel::new().on("better articulated", "{'questions': ['a', 'b']}"),
        );
        let planner = QueryPlanner::new(model);

        let subqueries = planner.generate_subqueries("deadlines?", 2).await.unwrap();
        assert_eq!(subqueries, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_over_delivery_is_truncated() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("better articulated", r#"{"questions": ["a", "b", "c", "d"]}"#),
        );
        let planner = QueryPlanner::new(model);

        let subqueries = planner.generate_subqueries("deadlines?", 2).await.unwrap();
        assert_eq!(subqueries, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_empty_array_is_fatal() {
        let model =
            Arc::new(ScriptedModel::new().on("better articulated", r#"{"questions": []}"#));
        let planner = QueryPlanner::new(model);

        let err = planner.generate_subqueries("deadlines?", 3).await.unwrap_err();
        assert!(matches!(err, BuddyError::QueryGenerationParse(_)));
    }
}
