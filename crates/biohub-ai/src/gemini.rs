//! Gemini `generateContent` provider.

use async_trait::async_trait;
use biohub_core::config::AiConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AiError, Result};
use crate::provider::{CompletionRequest, CompletionResponse, LlmProvider};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// Public Gemini API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// -- wire types ---------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [OutPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct OutPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<InPart>,
}

#[derive(Debug, Deserialize)]
struct InPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// -- provider -----------------------------------------------------------------

/// Provider backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Creates a provider from the `[ai]` config section.
    ///
    /// A missing key is not an error here; requests fail with
    /// [`AiError::MissingApiKey`] instead.
    pub fn from_config(config: &AiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a provider sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: &AiConfig) -> Self {
        let model = if config.model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model.trim().to_string()
        };
        let base_url = if config.base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            config.base_url.trim().trim_end_matches('/').to_string()
        };
        Self {
            client,
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model,
            base_url,
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn extract(&self, body: GenerateResponse) -> Result<CompletionResponse> {
        let Some(candidate) = body.candidates.into_iter().next() else {
            let reason = body
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(AiError::EmptyResponse(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(AiError::EmptyResponse(
                candidate
                    .finish_reason
                    .unwrap_or_else(|| "empty candidate".to_string()),
            ));
        }

        Ok(CompletionResponse {
            text,
            model: self.model.clone(),
            finish_reason: candidate.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AiError::MissingApiKey { provider: "gemini" })?;

        let body = GenerateRequest {
            contents: [Content {
                parts: [OutPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_output_tokens.unwrap_or(self.max_output_tokens),
                temperature: request.temperature.unwrap_or(self.temperature),
            },
        };

        tracing::debug!(model = %self.model, prompt_chars = request.prompt.len(), "generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
            tracing::warn!(status = status.as_u16(), %message, "Gemini request failed");
            return Err(AiError::api(status.as_u16(), message));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| AiError::Decode(e.to_string()))?;
        self.extract(parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
