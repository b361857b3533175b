//! Web Search Client
//!
//! `SearchClient` is the escalation collaborator: given a query, it returns
//! raw text that is expected to parse as a structured list of results. The
//! concrete client uses the DuckDuckGo instant-answer API (no key required)
//! and serializes its results as a JSON array so the pipeline's structured
//! parser can consume them.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::constants::search as search_constants;
use crate::types::{BuddyError, Result};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const API_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// External web search capability
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a search, returning raw text expected to parse as a result list
    async fn run(&self, query: &str) -> Result<String>;
}

/// One search result as serialized into the raw response string
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
}

/// DuckDuckGo instant-answer search client
pub struct DuckDuckGoClient {
    client: reqwest::Client,
    max_results: usize,
}

impl DuckDuckGoClient {
    pub fn new(max_results: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(search_constants::REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("bullbuddy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BuddyError::Search(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_results,
        })
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoClient {
    async fn run(&self, query: &str) -> Result<String> {
        let url = Url::parse_with_params(
            API_ENDPOINT,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
        .map_err(|e| BuddyError::Search(format!("Failed to build search URL: {}", e)))?;

        let body: Value = self.client.get(url).send().await?.json().await?;

        let results = extract_results(&body, self.max_results);
        debug!(query = %query, count = results.len(), "web search completed");

        Ok(serde_json::to_string(&results)?)
    }
}

/// Pull titled snippets out of an instant-answer response: the abstract
/// first, then related topics (flattening nested topic groups).
fn extract_results(body: &Value, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if let Some(abstract_text) = body.get("AbstractText").and_then(Value::as_str)
        && !abstract_text.is_empty()
    {
        let title = body
            .get("Heading")
            .and_then(Value::as_str)
            .unwrap_or("Summary");
        results.push(SearchResult {
            title: clean(title),
            snippet: clean(abstract_text),
        });
    }

    if let Some(topics) = body.get("RelatedTopics").and_then(Value::as_array) {
        collect_topics(topics, &mut results, max_results);
    }

    results.truncate(max_results);
    results
}

fn collect_topics(topics: &[Value], results: &mut Vec<SearchResult>, max_results: usize) {
    for topic in topics {
        if results.len() >= max_results {
            return;
        }

        // topic groups nest their entries under "Topics"
        if let Some(nested) = topic.get("Topics").and_then(Value::as_array) {
            collect_topics(nested, results, max_results);
            continue;
        }

        if let Some(text) = topic.get("Text").and_then(Value::as_str)
            && !text.is_empty()
        {
            let title = topic
                .get("FirstURL")
                .and_then(Value::as_str)
                .unwrap_or_default();
            results.push(SearchResult {
                title: clean(title),
                snippet: clean(text),
            });
        }
    }
}

fn clean(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_abstract_and_topics() {
        let body = json!({
            "Heading": "Admissions",
            "AbstractText": "Applications   are due\nJune 1.",
            "RelatedTopics": [
                {"Text": "Fall deadline details", "FirstURL": "https://example.edu/fall"},
                {"Topics": [{"Text": "Spring deadline details", "FirstURL": "https://example.edu/spring"}]}
            ]
        });

        let results = extract_results(&body, 5);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Admissions");
        assert_eq!(results[0].snippet, "Applications are due June 1.");
        assert_eq!(results[1].snippet, "Fall deadline details");
        assert_eq!(results[2].snippet, "Spring deadline details");
    }

    #[test]
    fn test_extract_respects_max_results() {
        let body = json!({
            "AbstractText": "",
            "RelatedTopics": [
                {"Text": "one"}, {"Text": "two"}, {"Text": "three"}
            ]
        });

        let results = extract_results(&body, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_empty_response_yields_empty_list() {
        let results = extract_results(&json!({}), 5);
        assert!(results.is_empty());
    }

    #[test]
    fn test_results_serialize_as_parseable_list() {
        let results = vec![SearchResult {
            title: "T".to_string(),
            snippet: "S".to_string(),
        }];
        let raw = serde_json::to_string(&results).unwrap();
        let parsed = crate::ai::parse::parse_string_list(&raw).unwrap();
        assert_eq!(parsed, vec!["T - S"]);
    }
}
