//! Conversation Memory
//!
//! Summary-buffer memory for the chat loop: recent turns are kept verbatim
//! up to a token budget; when the budget overflows, the oldest turns are
//! folded into a running summary with one model call. Memory lives for the
//! process only; nothing is persisted across runs.

use std::collections::VecDeque;

use tracing::debug;

use crate::ai::provider::SharedModel;
use crate::ai::tokenizer::TokenCounter;
use crate::types::Result;

/// One question/answer exchange
#[derive(Debug, Clone)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

impl Turn {
    fn render(&self) -> String {
        format!("Student: {}\nAssistant: {}", self.question, self.answer)
    }
}

/// Summary-buffer conversation memory
pub struct ConversationMemory {
    model: SharedModel,
    counter: TokenCounter,
    max_tokens: usize,
    summary: String,
    turns: VecDeque<Turn>,
}

impl ConversationMemory {
    pub fn new(model: SharedModel, max_tokens: usize) -> Self {
        Self {
            model,
            counter: TokenCounter::default(),
            max_tokens,
            summary: String::new(),
            turns: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.turns.is_empty()
    }

    /// Rendered chat history: running summary first, then verbatim turns
    pub fn context(&self) -> String {
        let mut sections = Vec::new();

        if !self.summary.is_empty() {
            sections.push(format!("Summary of earlier conversation:\n{}", self.summary));
        }
        for turn in &self.turns {
            sections.push(turn.render());
        }

        sections.join("\n\n")
    }

    /// Record a completed exchange and fold old turns into the summary if
    /// the verbatim buffer overflows its token budget.
    pub async fn save_turn(&mut self, question: &str, answer: &str) -> Result<()> {
        self.turns.push_back(Turn {
            question: question.to_string(),
            answer: answer.to_string(),
        });
        self.prune().await
    }

    fn buffered_tokens(&self) -> usize {
        self.turns
            .iter()
            .map(|turn| self.counter.count(&turn.render()))
            .sum()
    }

    async fn prune(&mut self) -> Result<()> {
        let mut evicted = Vec::new();
        while self.buffered_tokens() > self.max_tokens && self.turns.len() > 1 {
            if let Some(turn) = self.turns.pop_front() {
                evicted.push(turn);
            }
        }

        if evicted.is_empty() {
            return Ok(());
        }

        debug!(evicted = evicted.len(), "summarizing old conversation turns");
        let lines = evicted
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = build_summary_prompt(&self.summary, &lines);
        self.summary = self.model.complete(&prompt).await?.trim().to_string();
        Ok(())
    }
}

/// Progressive summarization prompt: fold new lines into the prior summary
fn build_summary_prompt(current_summary: &str, new_lines: &str) -> String {
    format!(
        "Progressively summarize the lines of conversation provided, adding onto the \
         previous summary and returning a new summary.\n\nCurrent summary:\n{}\n\nNew lines \
         of conversation:\n{}\n\nNew summary:",
        if current_summary.is_empty() {
            "(none)"
        } else {
            current_summary
        },
        new_lines
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_under_budget_keeps_turns_verbatim() {
        let model = Arc::new(ScriptedModel::new());
        let mut memory = ConversationMemory::new(model.clone(), 1000);

        memory.save_turn("when is orientation?", "August 20").await.unwrap();

        assert!(!memory.is_empty());
        let context = memory.context();
        assert!(context.contains("Student: when is orientation?"));
        assert!(context.contains("Assistant: August 20"));
        // no summarization call happened
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflow_summarizes_oldest_turns() {
        let model = Arc::new(
            ScriptedModel::new().on("Progressively summarize", "Student asked about topic A."),
        );
        // tiny budget: ~10 tokens keeps a single short turn only
        let mut memory = ConversationMemory::new(model.clone(), 10);

        memory.save_turn("first question about topic A", "first answer").await.unwrap();
        memory
            .save_turn("second question about topic B", "second answer")
            .await
            .unwrap();

        let context = memory.context();
        assert!(context.contains("Summary of earlier conversation:"));
        assert!(context.contains("Student asked about topic A."));
        // newest turn stays verbatim
        assert!(context.contains("second question about topic B"));
        assert!(!context.contains("first question about topic A"));
        assert_eq!(model.prompts_containing("Progressively summarize"), 1);
    }

    #[test]
    fn test_empty_memory_context() {
        let model = Arc::new(ScriptedModel::new());
        let memory = ConversationMemory::new(model, 100);
        assert!(memory.is_empty());
        assert_eq!(memory.context(), "");
    }
}
