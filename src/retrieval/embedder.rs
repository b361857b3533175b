//! Embedding Provider
//!
//! Hosted embeddings API client with a content-hash cache so identical
//! texts (re-ingested documents, repeated queries) are embedded once per
//! process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::constants::network;
use crate::types::{BuddyError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Shared embedder handle
pub type SharedEmbedder = Arc<dyn Embedder>;

/// Text embedding provider
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, preserving order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed(std::slice::from_ref(&text.to_string())).await?;
        embeddings
            .pop()
            .ok_or_else(|| BuddyError::Embedding("empty embedding batch response".to_string()))
    }
}

/// OpenAI embeddings API client with per-process caching
pub struct OpenAiEmbedder {
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
    cache: DashMap<String, Vec<f32>>,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig, llm: &LlmConfig) -> Result<Self> {
        let api_key_str = llm
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                BuddyError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .clone()
            .or_else(|| llm.api_base.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| BuddyError::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model: config.model.clone(),
            client,
            cache: DashMap::new(),
        })
    }

    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.api_base);
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BuddyError::LlmApi(format!(
                "Embeddings API error ({}): {}",
                status, body
            )));
        }

        let mut body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| BuddyError::Embedding(format!("Failed to parse response: {}", e)))?;

        if body.data.len() != texts.len() {
            return Err(BuddyError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let keys: Vec<String> = texts.iter().map(|t| content_key(t)).collect();

        let mut results: Vec<Option<Vec<f32>>> = keys
            .iter()
            .map(|key| self.cache.get(key).map(|entry| entry.value().clone()))
            .collect();

        let missing: Vec<usize> = (0..texts.len()).filter(|&i| results[i].is_none()).collect();

        if !missing.is_empty() {
            debug!(
                cached = texts.len() - missing.len(),
                requested = missing.len(),
                "embedding batch"
            );

            let uncached: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let embeddings = (|| async { self.request_embeddings(&uncached).await })
                .retry(ExponentialBuilder::default().with_max_times(network::MAX_PROVIDER_RETRIES))
                .when(|e: &BuddyError| e.is_transient())
                .notify(|err: &BuddyError, dur: Duration| {
                    warn!("Retrying embeddings request in {:?}: {}", dur, err);
                })
                .await?;

            for (&i, embedding) in missing.iter().zip(embeddings) {
                self.cache.insert(keys[i].clone(), embedding.clone());
                results[i] = Some(embedding);
            }
        }

        Ok(results.into_iter().flatten().collect())
    }
}

/// Cache key: SHA-256 of the text
fn content_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

// Request/Response types

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_stable_and_distinct() {
        assert_eq!(content_key("abc"), content_key("abc"));
        assert_ne!(content_key("abc"), content_key("abd"));
    }

    #[test]
    fn test_embedding_response_ordering() {
        let raw = r#"{"data":[{"index":1,"embedding":[2.0]},{"index":0,"embedding":[1.0]}]}"#;
        let mut body: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        body.data.sort_by_key(|d| d.index);
        assert_eq!(body.data[0].embedding, vec![1.0]);
        assert_eq!(body.data[1].embedding, vec![2.0]);
    }
}
