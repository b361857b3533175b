//! Evaluation Harness
//!
//! Scores an answering strategy against a test set of question/ground-truth
//! pairs. Each answer gets the reflective critique (five rubric dimensions,
//! weighted) plus a correctness score against the reference answer, and the
//! whole run is written out as a JSON report.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::ai::provider::SharedModel;
use crate::rag::judge::Judge;
use crate::types::{BuddyError, Result};

/// One test set entry
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub question: String,
    pub ground_truth: String,
}

/// Scores for one answered case
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub question: String,
    pub answer: String,
    /// Weighted rubric critique of the answer against the question
    pub critique_score: f64,
    /// Per-dimension rubric scores
    pub critique_details: std::collections::HashMap<String, f64>,
    /// Agreement with the reference answer
    pub correctness: f64,
}

/// A complete evaluation run
#[derive(Debug, Serialize)]
pub struct EvalReport {
    pub id: String,
    pub strategy: String,
    pub created_at: String,
    pub cases: Vec<CaseResult>,
    pub mean_critique: f64,
    pub mean_correctness: f64,
}

/// Scores answers produced by any strategy
pub struct Evaluator {
    model: SharedModel,
    judge: Judge,
}

impl Evaluator {
    pub fn new(model: SharedModel) -> Self {
        Self {
            judge: Judge::new(model.clone()),
            model,
        }
    }

    /// Load a JSON test set: an array of {question, ground_truth} objects
    pub fn load_cases(path: &Path) -> Result<Vec<TestCase>> {
        let contents = std::fs::read_to_string(path)?;
        let cases: Vec<TestCase> = serde_json::from_str(&contents)?;
        if cases.is_empty() {
            return Err(BuddyError::Eval(format!(
                "test set {} contains no cases",
                path.display()
            )));
        }
        Ok(cases)
    }

    /// Score one answered case
    pub async fn score_case(&self, case: &TestCase, answer: &str) -> Result<CaseResult> {
        let critique = self.judge.critique(&case.question, answer).await?;
        let correctness = self.score_correctness(case, answer).await?;

        Ok(CaseResult {
            question: case.question.clone(),
            answer: answer.to_string(),
            critique_score: critique.weighted_score,
            critique_details: critique.details,
            correctness,
        })
    }

    async fn score_correctness(&self, case: &TestCase, answer: &str) -> Result<f64> {
        let prompt = build_correctness_prompt(&case.question, &case.ground_truth, answer);
        let raw = self.model.complete(&prompt).await?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| BuddyError::EvaluationParse {
                dimension: "correctness".to_string(),
                raw,
            })
    }

    /// Assemble scored cases into a report
    pub fn build_report(&self, strategy: &str, cases: Vec<CaseResult>) -> EvalReport {
        let mean_critique = mean(cases.iter().map(|c| c.critique_score));
        let mean_correctness = mean(cases.iter().map(|c| c.correctness));

        EvalReport {
            id: Uuid::new_v4().to_string(),
            strategy: strategy.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            cases,
            mean_critique,
            mean_correctness,
        }
    }

    /// Write a report as pretty-printed JSON
    pub fn write_report(report: &EvalReport, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(report)?)?;
        info!(path = %path.display(), "wrote evaluation report");
        Ok(())
    }
}

/// Score agreement between an answer and the reference answer
fn build_correctness_prompt(question: &str, ground_truth: &str, answer: &str) -> String {
    format!(
        "For the question '{question}', compare the generated answer '{answer}' to the \
         reference answer '{ground_truth}'. On a scale from 0 to 1, where 1 means the \
         generated answer states the same facts as the reference answer and 0 means it \
         contradicts or misses them, provide a numerical score only."
    )
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count > 0 { sum / count as f64 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_case() -> TestCase {
        TestCase {
            question: "When is the fall deadline?".to_string(),
            ground_truth: "June 1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_score_case_combines_critique_and_correctness() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("reference answer", "1.0")
                .with_default("0.8"),
        );
        let evaluator = Evaluator::new(model);

        let result = evaluator
            .score_case(&test_case(), "Applications are due June 1.")
            .await
            .unwrap();

        assert_eq!(result.correctness, 1.0);
        assert!((result.critique_score - 0.8).abs() < 1e-9);
        assert_eq!(result.critique_details.len(), 5);
    }

    #[tokio::test]
    async fn test_unparseable_correctness_is_fatal() {
        let model = Arc::new(
            ScriptedModel::new()
                .on("reference answer", "mostly right")
                .with_default("0.8"),
        );
        let evaluator = Evaluator::new(model);

        let err = evaluator
            .score_case(&test_case(), "Applications are due June 1.")
            .await
            .unwrap_err();
        assert!(matches!(err, BuddyError::EvaluationParse { .. }));
    }

    #[tokio::test]
    async fn test_report_means_and_serialization() {
        let model = Arc::new(ScriptedModel::new().with_default("0.5"));
        let evaluator = Evaluator::new(model);

        let cases = vec![
            CaseResult {
                question: "q1".to_string(),
                answer: "a1".to_string(),
                critique_score: 0.6,
                critique_details: Default::default(),
                correctness: 1.0,
            },
            CaseResult {
                question: "q2".to_string(),
                answer: "a2".to_string(),
                critique_score: 0.8,
                critique_details: Default::default(),
                correctness: 0.5,
            },
        ];
        let report = evaluator.build_report("base", cases);

        assert!((report.mean_critique - 0.7).abs() < 1e-9);
        assert!((report.mean_correctness - 0.75).abs() < 1e-9);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        Evaluator::write_report(&report, &path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["strategy"], "base");
        assert_eq!(written["cases"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_load_cases_rejects_empty_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            Evaluator::load_cases(&path),
            Err(BuddyError::Eval(_))
        ));
    }

    #[test]
    fn test_load_cases_parses_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cases.json");
        std::fs::write(
            &path,
            r#"[{"question": "q", "ground_truth": "g"}]"#,
        )
        .unwrap();
        let cases = Evaluator::load_cases(&path).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].question, "q");
    }
}
