//! Rubric Evaluation (Judge) and Score Aggregation (Critic)
//!
//! The judge prompts the model once per rubric dimension and parses each
//! response as a bare float. The critic folds those scores into one weighted
//! average. Scores are taken as the model reports them: values outside
//! [0, 1] pass through unchanged.

use std::collections::HashMap;

use crate::ai::provider::SharedModel;
use crate::constants::critique as weights;
use crate::types::{BuddyError, Result};

use super::prompts;

/// One rubric dimension: name, aggregation weight, and prompt builder
struct RubricDimension {
    name: &'static str,
    weight: f64,
    build: fn(&str, &str) -> String,
}

/// The five quality dimensions, in evaluation order
const RUBRIC: [RubricDimension; 5] = [
    RubricDimension {
        name: "relevance",
        weight: weights::RELEVANCE_WEIGHT,
        build: prompts::build_relevance_prompt,
    },
    RubricDimension {
        name: "clarity",
        weight: weights::CLARITY_WEIGHT,
        build: prompts::build_clarity_prompt,
    },
    RubricDimension {
        name: "coherence",
        weight: weights::COHERENCE_WEIGHT,
        build: prompts::build_coherence_prompt,
    },
    RubricDimension {
        name: "details",
        weight: weights::DETAILS_WEIGHT,
        build: prompts::build_details_prompt,
    },
    RubricDimension {
        name: "suitability",
        weight: weights::SUITABILITY_WEIGHT,
        build: prompts::build_suitability_prompt,
    },
];

fn weight_for(dimension: &str) -> f64 {
    RUBRIC
        .iter()
        .find(|d| d.name == dimension)
        .map(|d| d.weight)
        .unwrap_or(1.0)
}

/// Outcome of one critique call
#[derive(Debug, Clone, Default)]
pub struct Critique {
    /// Weighted average of the dimension scores
    pub weighted_score: f64,
    /// Per-dimension scores, one entry per rubric dimension
    pub details: HashMap<String, f64>,
}

/// LLM-backed rubric evaluator
pub struct Judge {
    model: SharedModel,
}

impl Judge {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    /// Score `generated_text` against `query` along every rubric dimension.
    ///
    /// A response that does not parse as a float is fatal for the whole
    /// evaluation call; there is no silent default.
    pub async fn evaluate(&self, query: &str, generated_text: &str) -> Result<HashMap<String, f64>> {
        let mut evaluations = HashMap::with_capacity(RUBRIC.len());

        for dimension in &RUBRIC {
            let prompt = (dimension.build)(query, generated_text);
            let raw = self.model.complete(&prompt).await?;
            let score = parse_score(dimension.name, &raw)?;
            evaluations.insert(dimension.name.to_string(), score);
        }

        Ok(evaluations)
    }

    /// Evaluate and aggregate into a weighted quality score
    pub async fn critique(&self, query: &str, generated_text: &str) -> Result<Critique> {
        let details = self.evaluate(query, generated_text).await?;
        Ok(Critique {
            weighted_score: weighted_average(&details),
            details,
        })
    }
}

/// Parse a rubric response as a bare float
fn parse_score(dimension: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| BuddyError::EvaluationParse {
            dimension: dimension.to_string(),
            raw: raw.to_string(),
        })
}

/// Weighted average over the dimensions present; 0 when there are none
pub fn weighted_average(details: &HashMap<String, f64>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (dimension, score) in details {
        let weight = weight_for(dimension);
        weighted_sum += score * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;
    use std::sync::Arc;

    fn scored_model() -> Arc<ScriptedModel> {
        Arc::new(
            ScriptedModel::new()
                .on("how relevant", "0.8")
                .on("How clear", "0.9")
                .on("flow together", "0.7")
                .on("how thoroughly", "0.6")
                .on("suitability", "0.85"),
        )
    }

    #[tokio::test]
    async fn test_evaluate_returns_all_five_dimensions() {
        let model = scored_model();
        let judge = Judge::new(model);

        let evaluations = judge.evaluate("q", "t").await.unwrap();
        assert_eq!(evaluations.len(), 5);
        for key in ["relevance", "clarity", "coherence", "details", "suitability"] {
            assert!(evaluations.contains_key(key), "missing {}", key);
        }
    }

    #[tokio::test]
    async fn test_critique_weighted_example() {
        let model = scored_model();
        let judge = Judge::new(model);

        let critique = judge.critique("q", "t").await.unwrap();
        // (3*0.8 + 1*0.9 + 0.5*0.7 + 1.5*0.6 + 2*0.85) / 8 = 0.78125
        assert!((critique.weighted_score - 0.78125).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_out_of_range_scores_pass_through() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("how relevant", "1.4")
                .with_default("0.5"),
        );
        let judge = Judge::new(model);

        let critique = judge.critique("q", "t").await.unwrap();
        assert_eq!(critique.details["relevance"], 1.4);
        // no clamping in the aggregate either
        assert!(critique.weighted_score > 0.5);
    }

    #[tokio::test]
    async fn test_unparseable_score_is_fatal() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("how relevant", "very relevant indeed")
                .with_default("0.5"),
        );
        let judge = Judge::new(model);

        let err = judge.critique("q", "t").await.unwrap_err();
        match err {
            BuddyError::EvaluationParse { dimension, raw } => {
                assert_eq!(dimension, "relevance");
                assert!(raw.contains("very relevant"));
            }
            other => panic!("expected EvaluationParse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_critique_is_idempotent() {
        let model = scored_model();
        let judge = Judge::new(model);

        let first = judge.critique("q", "t").await.unwrap();
        let second = judge.critique("q", "t").await.unwrap();
        assert_eq!(first.weighted_score, second.weighted_score);
        assert_eq!(first.details, second.details);
    }

    #[test]
    fn test_weighted_average_empty_is_zero() {
        assert_eq!(weighted_average(&HashMap::new()), 0.0);
    }

    #[test]
    fn test_unknown_dimension_defaults_to_weight_one() {
        let mut details = HashMap::new();
        details.insert("novelty".to_string(), 0.4);
        assert!((weighted_average(&details) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_score_parsing_trims_whitespace() {
        assert_eq!(parse_score("clarity", " 0.75\n").unwrap(), 0.75);
        assert!(parse_score("clarity", "0.75 out of 1").is_err());
    }
}
