//! In-process provider that replays canned answers.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AiError, Result};
use crate::provider::{CompletionRequest, CompletionResponse, LlmProvider};

/// Answer given when nothing was queued.
pub const DEFAULT_MOCK_RESPONSE: &str =
    "This is a mock research-assistant answer. Configure a Gemini API key for real responses.";

#[derive(Debug, Default)]
struct MockState {
    queued: VecDeque<String>,
    last: Option<String>,
    prompts: Vec<String>,
}

/// Provider answering from a queue.
///
/// Responses are handed out in order; once one remains it repeats. A failing
/// mock answers every request with [`AiError::Unavailable`].
#[derive(Debug)]
pub struct MockLlmProvider {
    state: Mutex<MockState>,
    failing: bool,
    model: String,
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmProvider {
    /// Creates a mock answering with [`DEFAULT_MOCK_RESPONSE`].
    pub fn new() -> Self {
        Self::with_responses(Vec::<String>::new())
    }

    /// Creates a mock replaying `responses`.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: Mutex::new(MockState {
                queued: responses.into_iter().map(Into::into).collect(),
                ..MockState::default()
            }),
            failing: false,
            model: "mock".to_string(),
        }
    }

    /// Creates a mock whose every request fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.state.lock().await.prompts.clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut state = self.state.lock().await;
        state.prompts.push(request.prompt);

        if self.failing {
            return Err(AiError::Unavailable("mock provider set to fail".to_string()));
        }

        let text = if state.queued.len() > 1 {
            state.queued.pop_front()
        } else {
            state.queued.front().cloned()
        };
        let text = text
            .or_else(|| state.last.clone())
            .unwrap_or_else(|| DEFAULT_MOCK_RESPONSE.to_string());
        state.last = Some(text.clone());

        Ok(CompletionResponse {
            text,
            model: self.model.clone(),
            finish_reason: Some("STOP".to_string()),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
