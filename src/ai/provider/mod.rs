//! LLM Provider Abstraction
//!
//! Defines the ChatModel trait for plain-text completion.
//!
//! The reflective pipeline consumes whole response strings synchronously;
//! `complete_stream` exists for the surrounding chat layer only and yields
//! incremental text fragments over a single logical call. The two contracts
//! are deliberately distinct.

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{BuddyError, Result};

/// Incremental text fragments from a streaming completion
pub type TokenStream = BoxStream<'static, Result<String>>;

/// Shared model handle passed into the pipeline and chains
pub type SharedModel = Arc<dyn ChatModel>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never serialized to output and are redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for generation (0.0 = deterministic)
    pub temperature: f32,
    /// API key (OpenAI)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl From<&LlmConfig> for ProviderConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

// =============================================================================
// ChatModel Trait
// =============================================================================

/// Plain-text completion provider
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a prompt, returning the whole response text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Stream a completion as incremental text fragments.
    ///
    /// The default implementation completes the whole prompt and yields it as
    /// a single fragment; providers override this with real token streaming.
    async fn complete_stream(&self, prompt: &str) -> Result<TokenStream> {
        let text = self.complete(prompt).await?;
        Ok(futures::stream::once(async move { Ok(text) }).boxed())
    }

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is available
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared model from configuration
pub fn create_model(config: &LlmConfig) -> Result<SharedModel> {
    let provider_config = ProviderConfig::from(config);
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(provider_config)?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(provider_config)?)),
        _ => Err(BuddyError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_debug_redacts_key() {
        let config = ProviderConfig {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
            temperature: 0.0,
            api_key: Some("sk-secret".to_string()),
            api_base: None,
            max_tokens: 1024,
        };
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_create_model_rejects_unknown_provider() {
        let mut llm = LlmConfig::default();
        llm.provider = "frontier-9000".to_string();
        assert!(matches!(
            create_model(&llm),
            Err(BuddyError::Config(_))
        ));
    }
}
