//! The provider seam.
//!
//! Every text model sits behind [`LlmProvider`]. Handlers and the
//! [`ResearchAssistant`](crate::ResearchAssistant) only ever see the trait,
//! so the Gemini endpoint and the in-process mock are interchangeable.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Shared handle to a provider.
pub type SharedProvider = Arc<dyn LlmProvider>;

/// A single-turn text completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Full prompt text sent to the model.
    pub prompt: String,
    /// Upper bound on generated tokens; provider default when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature; provider default when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Creates a request with provider defaults.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens: None,
            temperature: None,
        }
    }

    /// Sets the token limit.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Text produced by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,
    /// Model that produced the text.
    pub model: String,
    /// Why generation stopped, as reported by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// A text generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generates a completion for `request`.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name for diagnostics.
    fn name(&self) -> &str;

    /// Model identifier recorded alongside prompts.
    fn model(&self) -> &str;
}
