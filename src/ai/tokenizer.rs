//! Token Counting
//!
//! Token estimation for the conversation memory budget.
//!
//! Counts are estimates, not tokenizer-exact; the memory layer only needs a
//! stable signal for "history is getting long enough to summarize".

/// Token estimation method
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TokenEstimator {
    /// Character-based estimation (4 chars = 1 token), good for English prose
    #[default]
    CharBased,
    /// Word-based estimation (0.75 tokens per word on average)
    WordBased,
}

/// Token counter for context management
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounter {
    estimator: TokenEstimator,
}

impl TokenCounter {
    pub fn new(estimator: TokenEstimator) -> Self {
        Self { estimator }
    }

    /// Estimate token count for a string
    pub fn count(&self, text: &str) -> usize {
        match self.estimator {
            TokenEstimator::CharBased => text.chars().count().div_ceil(4),
            TokenEstimator::WordBased => {
                let word_count = text.split_whitespace().count();
                (word_count as f32 * 0.75).ceil() as usize + 1
            }
        }
    }
}
