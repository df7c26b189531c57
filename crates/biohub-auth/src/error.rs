//! Auth-specific error types.

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid (not a valid JWT).
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// JWT signature verification failed.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token audience doesn't match the configured audience.
    #[error("invalid audience")]
    InvalidAudience,

    /// Token carries no subject.
    #[error("token missing subject claim")]
    MissingSubject,

    /// The auth service refused the token.
    #[error("token rejected: {0}")]
    Rejected(String),

    /// The auth service answered a sign-in, sign-up, or sign-out call with an error.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the auth service.
        message: String,
    },

    /// The auth service could not be reached or sent something unreadable.
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Whether this error should result in a 4xx (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        match self {
            AuthError::Unavailable(_) => false,
            AuthError::Api { status, .. } => *status < 500,
            _ => true,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Unavailable(err.to_string())
    }
}
