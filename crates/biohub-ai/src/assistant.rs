//! Research-assistant service.

use tracing::Instrument;

use crate::error::{AiError, Result};
use crate::prompts::{literature_review_prompt, research_assistant_prompt};
use crate::provider::{CompletionRequest, SharedProvider};

/// Answers research questions and writes literature reviews through a
/// [`LlmProvider`](crate::LlmProvider).
#[derive(Clone)]
pub struct ResearchAssistant {
    provider: SharedProvider,
}

impl std::fmt::Debug for ResearchAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchAssistant")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .finish()
    }
}

impl ResearchAssistant {
    /// Creates an assistant over `provider`.
    pub fn new(provider: SharedProvider) -> Self {
        Self { provider }
    }

    /// Model identifier of the underlying provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Answers `question` in the research-assistant persona.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = non_blank(question, "question")?;
        let span = tracing::info_span!("assistant_ask", provider = self.provider.name());
        let response = self
            .provider
            .complete(CompletionRequest::new(research_assistant_prompt(question)))
            .instrument(span)
            .await?;
        tracing::debug!(chars = response.text.len(), "assistant answered");
        Ok(response.text)
    }

    /// Writes a literature review of `query` in the context of `context`.
    pub async fn literature_review(&self, query: &str, context: Option<&str>) -> Result<String> {
        let query = non_blank(query, "query")?;
        let response = self
            .provider
            .complete(CompletionRequest::new(literature_review_prompt(query, context)))
            .await?;
        tracing::debug!(
            provider = self.provider.name(),
            chars = response.text.len(),
            "literature review generated"
        );
        Ok(response.text)
    }
}

fn non_blank<'a>(text: &'a str, what: &'static str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AiError::EmptyPrompt(what));
    }
    Ok(trimmed)
}
