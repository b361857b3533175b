//! Ollama Local LLM Provider
//!
//! Plain-text completion against a locally-running Ollama server, with
//! NDJSON token streaming.

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{ChatModel, ProviderConfig, TokenStream};
use crate::types::{BuddyError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let api_base = Self::validate_endpoint(&api_base)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BuddyError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model: config.model,
            temperature: config.temperature,
            client,
        })
    }

    /// Validate endpoint URL; only http/https schemes are accepted and
    /// non-localhost endpoints produce a warning.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            BuddyError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(BuddyError::Config(format!(
                    "Unsupported Ollama endpoint scheme '{}' (expected http or https)",
                    scheme
                )));
            }
        }

        if let Some(host) = url.host_str()
            && host != "localhost"
            && host != "127.0.0.1"
            && host != "[::1]"
        {
            warn!("Ollama endpoint points at non-local host: {}", host);
        }

        Ok(endpoint.trim_end_matches('/').to_string())
    }

    fn build_request(&self, prompt: &str, stream: bool) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        }
    }

    async fn send_request(&self, request: &GenerateRequest) -> Result<reqwest::Response> {
        let url = format!("{}/api/generate", self.api_base);
        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BuddyError::LlmApi(format!(
                "Ollama API error ({}): {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Completing with Ollama (model: {})", self.model);

        let request = self.build_request(prompt, false);
        let response = self.send_request(&request).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BuddyError::LlmApi(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(body.response)
    }

    async fn complete_stream(&self, prompt: &str) -> Result<TokenStream> {
        let request = self.build_request(prompt, true);
        let response = self.send_request(&request).await?;

        let (tx, rx) = mpsc::unbounded::<Result<String>>();

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buf = String::new();

            while let Some(item) = stream.next().await {
                let chunk = match item {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.unbounded_send(Err(e.into()));
                        return;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));

                // Ollama streams NDJSON, one frame per line
                while let Some(pos) = buf.find('\n') {
                    let line = buf[..pos].trim().to_string();
                    buf.drain(..=pos);

                    if line.is_empty() {
                        continue;
                    }

                    if let Ok(frame) = serde_json::from_str::<GenerateResponse>(&line) {
                        if !frame.response.is_empty()
                            && tx.unbounded_send(Ok(frame.response)).is_err()
                        {
                            return;
                        }
                        if frame.done {
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx.boxed())
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.api_base);

        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Ollama server is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!("Ollama check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Ollama check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint_rejects_bad_scheme() {
        assert!(OllamaProvider::validate_endpoint("ftp://localhost:11434").is_err());
        assert!(OllamaProvider::validate_endpoint("not a url").is_err());
    }

    #[test]
    fn test_validate_endpoint_strips_trailing_slash() {
        let endpoint = OllamaProvider::validate_endpoint("http://localhost:11434/").unwrap();
        assert_eq!(endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_stream_frame_parsing() {
        let frame: GenerateResponse =
            serde_json::from_str(r#"{"response":"Hi","done":false}"#).unwrap();
        assert_eq!(frame.response, "Hi");
        assert!(!frame.done);
    }
}
