//! Shared mock collaborators for unit tests.
//!
//! The pipeline's collaborators are all trait objects, so tests script them:
//! `ScriptedModel` answers prompts by substring rules and records every
//! prompt it saw, while the retriever and search mocks count their calls.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::ai::provider::ChatModel;
use crate::retrieval::Retriever;
use crate::search::SearchClient;
use crate::types::{Chunk, ChunkMetadata, Result, ScoredChunk};

type Responder = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Chat model mock scripted with (substring, response) rules.
///
/// The first rule whose needle occurs in the prompt wins; unmatched prompts
/// get the default response. Every prompt is recorded for assertions.
pub struct ScriptedModel {
    rules: Vec<(String, Responder)>,
    default: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default: "ok".to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default(mut self, response: &str) -> Self {
        self.default = response.to_string();
        self
    }

    /// Respond with fixed text when the prompt contains `needle`
    pub fn on(mut self, needle: &str, response: &str) -> Self {
        let response = response.to_string();
        self.rules
            .push((needle.to_string(), Box::new(move |_| response.clone())));
        self
    }

    /// Respond with a computed value when the prompt contains `needle`
    pub fn on_fn(
        mut self,
        needle: &str,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.rules.push((needle.to_string(), Box::new(f)));
        self
    }

    /// Number of recorded prompts containing `needle`
    pub fn prompts_containing(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        for (needle, responder) in &self.rules {
            if prompt.contains(needle.as_str()) {
                return Ok(responder(prompt));
            }
        }
        Ok(self.default.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Retriever mock returning fixed chunks and counting calls.
pub struct FixedRetriever {
    chunks: Vec<ScoredChunk>,
    pub calls: AtomicUsize,
}

impl FixedRetriever {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            chunks: texts.iter().map(|t| scored_chunk(t)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn get_relevant(&self, _query: &str) -> Result<Vec<ScoredChunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.chunks.clone())
    }
}

/// Search client mock returning a fixed payload and counting calls.
pub struct ScriptedSearch {
    response: String,
    pub calls: AtomicUsize,
}

impl ScriptedSearch {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchClient for ScriptedSearch {
    async fn run(&self, _query: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Build a scored chunk around plain text
pub fn scored_chunk(text: &str) -> ScoredChunk {
    ScoredChunk {
        chunk: Chunk {
            id: format!("chunk-{}", text.len()),
            text: text.to_string(),
            metadata: ChunkMetadata::default(),
        },
        score: 1.0,
    }
}
