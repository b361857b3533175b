//! Reflective Pipeline Prompts
//!
//! Prompt templates for the self-reflective query pipeline. Every rubric
//! prompt instructs the model to answer with a bare number so the response
//! can be parsed as a score.

/// Score how relevant a generated response is to the originating question
pub fn build_relevance_prompt(query: &str, generated_text: &str) -> String {
    format!(
        "Given the context provided by this question: '{query}', evaluate on a scale from \
         0 to 1, where 1 is highly relevant and 0 is not relevant at all, how relevant this \
         generated response is: '{generated_text}'. Provide a numerical score only."
    )
}

/// Score how clear and understandable a text is
pub fn build_clarity_prompt(_query: &str, generated_text: &str) -> String {
    format!(
        "How clear and easily understandable is this text: '{generated_text}'? Rate its \
         clarity on a scale from 0 to 1, where 1 means very clear and 0 means very unclear. \
         Provide a numerical score only."
    )
}

/// Score how well the ideas in a text flow together
pub fn build_coherence_prompt(_query: &str, generated_text: &str) -> String {
    format!(
        "On a scale from 0 to 1, with 1 being highly coherent and 0 being not coherent at \
         all, how well do the ideas in this generated text flow together: \
         '{generated_text}'? Consider whether the text makes logical sense as a whole. \
         Provide a numerical score only."
    )
}

/// Score how thoroughly a text covers the question
pub fn build_details_prompt(query: &str, generated_text: &str) -> String {
    format!(
        "Assessing detail and exhaustiveness relative to the question '{query}', how \
         thoroughly does this generated text cover the topic: '{generated_text}'? Rate on a \
         scale from 0 to 1, where 1 is very detailed and exhaustive and 0 is not detailed \
         at all. Provide a numerical score only."
    )
}

/// Score how suitable a text is as an answer to the question
pub fn build_suitability_prompt(query: &str, generated_text: &str) -> String {
    format!(
        "Evaluate the suitability of this generated text: '{generated_text}' as an answer \
         to the original question '{query}'. On a scale from 0 to 1, where 1 is a perfect \
         answer and 0 is completely unsuitable, provide a numerical score only."
    )
}

/// Ask whether a question needs document retrieval at all
pub fn build_retrieval_decision_prompt(query: &str) -> String {
    format!(
        "Given the question: '{query}', is retrieval from an external source necessary to \
         answer it? Reply with only True or False."
    )
}

/// Ask for `count` better-articulated versions of a question
pub fn build_subquery_prompt(query: &str, count: usize) -> String {
    format!(
        "Given the question: '{query}', generate {count} questions that are better \
         articulated. Return the output as a JSON object with a single key \"questions\" \
         holding an array of strings."
    )
}

/// Ask the model to merge text fragments into one passage
pub fn build_consolidation_prompt(fragments: &[String]) -> String {
    format!(
        "Given the following set of texts, consolidate them into a single coherent \
         passage.\n\nTexts:\n{}",
        fragments.join("\n\n")
    )
}

/// Answer a question directly, without retrieved context
pub fn build_direct_answer_prompt(query: &str) -> String {
    format!(
        "You are an assistant supporting students of a university graduate program. \
         Answer the student's question as best you can from general knowledge, and keep \
         the answer concise. Question: '{query}'"
    )
}
