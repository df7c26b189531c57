//! Prompt templates for the research assistant.

/// Context used when a literature review names none.
pub const DEFAULT_REVIEW_CONTEXT: &str = "scientific research";

/// Wraps a user question in the research-assistant persona.
pub fn research_assistant_prompt(question: &str) -> String {
    format!(
        "You are Shawn, an AI research assistant for scientists.\n\
         Your task is to help with literature review, experimental design, and data analysis.\n\
         Be concise but thorough in your responses.\n\
         \n\
         User question: {question}"
    )
}

/// Builds a literature-review request for `query`.
///
/// A blank `context` falls back to [`DEFAULT_REVIEW_CONTEXT`].
pub fn literature_review_prompt(query: &str, context: Option<&str>) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_REVIEW_CONTEXT);
    format!(
        "Generate a concise literature review about \"{query}\" in the context of {context}.\n\
         Focus on recent and relevant studies, summarize key findings, and highlight gaps in the research.\n\
         Format the response in clear paragraphs with proper academic tone."
    )
}
