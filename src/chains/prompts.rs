//! Conversational Chain Prompts

/// Rewrite a follow-up question as a standalone question using the history
pub fn build_condense_prompt(history: &str, question: &str) -> String {
    format!(
        "Given the following conversation and a follow-up question, rephrase the follow-up \
         question to be a standalone question, in its original language.\n\nChat \
         history:\n{history}\n\nFollow-up question: {question}\n\nStandalone question:"
    )
}

/// Write a hypothetical passage that would answer the question; used as the
/// retrieval probe for the HyDE strategy
pub fn build_hyde_prompt(history: &str, question: &str) -> String {
    format!(
        "Write a short passage from a university program handbook that would plausibly \
         answer the question below. Write the passage only, without commentary.\n\nChat \
         history:\n{history}\n\nQuestion: {question}\n\nPassage:"
    )
}

/// Produce alternative phrasings of the question, one per line
pub fn build_expansion_prompt(question: &str) -> String {
    format!(
        "You are an expert at assisting students with questions about a university graduate \
         program. Perform query expansion on the question below: if there are multiple \
         common ways of phrasing it or common synonyms for its key words, return multiple \
         versions with the different phrasings, one per line. Do not rephrase acronyms or \
         words you are not familiar with. Return at least 3 versions of the \
         question.\n\nQuestion: {question}"
    )
}

/// Answer the question from retrieved context
pub fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a chat assistant supporting university students with their questions. If \
         applicable, use the context provided to better answer the question. If the \
         question cannot be answered from the context provided, just say that you don't \
         know.\nContext: {context}\nQuestion: {question}\nAnswer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condense_prompt_embeds_history_and_question() {
        let prompt = build_condense_prompt("Student: hi\nAssistant: hello", "what about spring?");
        assert!(prompt.contains("Student: hi"));
        assert!(prompt.contains("Follow-up question: what about spring?"));
    }

    #[test]
    fn test_answer_prompt_grounds_on_context() {
        let prompt = build_answer_prompt("deadline is June 1", "when is the deadline?");
        assert!(prompt.contains("Context: deadline is June 1"));
        assert!(prompt.contains("you don't know"));
    }
}
