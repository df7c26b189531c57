//! BioHub AI: generative text behind a provider trait.
//!
//! # Modules
//!
//! - [`provider`]: [`LlmProvider`] and its request/response types
//! - [`gemini`]: [`GeminiProvider`] for the Gemini REST API
//! - [`mock`]: [`MockLlmProvider`] for development and tests
//! - [`prompts`]: research-assistant prompt templates
//! - [`assistant`]: [`ResearchAssistant`], the service handlers call
//! - [`error`]: [`AiError`] and the `Result` alias

#![doc = include_str!("../README.md")]

pub mod assistant;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod prompts;
pub mod provider;

pub use assistant::ResearchAssistant;
pub use error::{AiError, Result};
pub use gemini::GeminiProvider;
pub use mock::MockLlmProvider;
pub use provider::{CompletionRequest, CompletionResponse, LlmProvider, SharedProvider};

use std::sync::Arc;

use biohub_core::config::AiConfig;

/// Builds the provider selected by the `[ai]` section.
///
/// `mock = true` answers with canned text; otherwise requests go to Gemini.
pub fn provider_from_config(config: &AiConfig) -> SharedProvider {
    if config.mock {
        tracing::info!("Using mock AI provider");
        return Arc::new(MockLlmProvider::new());
    }
    if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        tracing::warn!("No Gemini API key configured; AI requests will fail");
    }
    Arc::new(GeminiProvider::from_config(config))
}
