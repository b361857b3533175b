//! AI Integration Layer
//!
//! LLM provider abstraction, response parsing, and token estimation.

pub mod parse;
pub mod provider;
pub mod tokenizer;

pub use parse::{StructuredParseError, parse_string_list, parse_structured};
pub use provider::{
    ChatModel, OllamaProvider, OpenAiProvider, ProviderConfig, SharedModel, TokenStream,
    create_model,
};
pub use tokenizer::{TokenCounter, TokenEstimator};
