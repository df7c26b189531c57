//! Error types for biohub-ai.

/// Result type alias for text generation.
pub type Result<T> = std::result::Result<T, AiError>;

/// Errors raised while generating text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AiError {
    /// No API key is configured for the model endpoint.
    #[error("no API key configured for {provider}")]
    MissingApiKey {
        /// Provider that needed the key.
        provider: &'static str,
    },

    /// The request never produced an answer.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-success status.
    #[error("model endpoint returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the endpoint.
        message: String,
    },

    /// The model answered without any text.
    #[error("model returned no text: {0}")]
    EmptyResponse(String),

    /// The answer could not be decoded.
    #[error("failed to decode model response: {0}")]
    Decode(String),

    /// Nothing to send: the question or query was blank.
    #[error("{0} is empty")]
    EmptyPrompt(&'static str),

    /// The provider is switched off or failing on purpose.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl AiError {
    /// Creates an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        AiError::Api {
            status,
            message: message.into(),
        }
    }
}
