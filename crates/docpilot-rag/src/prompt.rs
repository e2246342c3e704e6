//! Context and prompt text handed to the generation model.

use std::fmt::Write;

use docpilot_core::types::RetrievalResult;

pub const CONTEXT_HEADER: &str = "\n--- Retrieved Documentation Context ---";
pub const CONTEXT_FOOTER: &str = "\n-------------------------------------\n";

const INSTRUCTION: &str = "Based on the provided documentation, please answer the user's question. \
If the context does not contain the answer, state that you could not find relevant information in the documentation.";

/// Render retrieved chunks in rank order between the context delimiters.
pub fn format_context(retrieval: &RetrievalResult) -> String {
    let mut context = String::from(CONTEXT_HEADER);
    for chunk in retrieval.iter() {
        // Writing to a String cannot fail.
        let _ = write!(
            context,
            "\n\nSource {}: {} (Section: {})\nContent: {}\n",
            chunk.rank, chunk.source, chunk.heading, chunk.content
        );
    }
    context.push_str(CONTEXT_FOOTER);
    context
}

pub fn compose_prompt(question: &str, context: &str) -> String {
    format!("Question: {question}\n\n{context}\n\n{INSTRUCTION}")
}
