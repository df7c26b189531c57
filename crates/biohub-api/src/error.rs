//! HTTP errors.
//!
//! Every failure leaves the API as `{"error": "<message>"}`; form
//! validation failures also carry `"fields": {field: message}`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use biohub_auth::AuthError;
use biohub_core::FieldErrors;
use biohub_store::StoreError;
use http::StatusCode;
use serde::Serialize;

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors a handler can answer with.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// 400: malformed or missing input.
    #[error("{message}")]
    BadRequest {
        /// Message shown to the caller.
        message: String,
        /// Offending fields, when known.
        fields: FieldErrors,
    },

    /// 401: no signed-in user.
    #[error("{0}")]
    Unauthorized(String),

    /// 403: signed in, but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// 404: nothing at that key.
    #[error("{0}")]
    NotFound(String),

    /// 409: a unique value is taken.
    #[error("{0}")]
    Conflict(String),

    /// 422: a submitted form failed its rules.
    #[error("{message}")]
    InvalidForm {
        /// Summary message.
        message: String,
        /// Per-field messages.
        fields: FieldErrors,
    },

    /// 429: the monthly assistant allowance is spent.
    #[error("{0}")]
    QuotaExceeded(String),

    /// 500: something on our side failed.
    #[error("{0}")]
    Internal(String),

    /// 502: an upstream service failed.
    #[error("{0}")]
    BadGateway(String),

    /// 503: a required service is not configured.
    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    /// Creates a 400 without field details.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    /// Creates a 500 with `message`.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// Status code this error answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidForm { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn fields(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::BadRequest { fields, .. } | ApiError::InvalidForm { fields, .. }
                if !fields.is_empty() =>
            {
                Some(fields)
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            fields: self.fields(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<biohub_core::Error> for ApiError {
    fn from(err: biohub_core::Error) -> Self {
        use biohub_core::Error;

        match err {
            Error::Validation { field, message } => {
                let mut fields = FieldErrors::new();
                if let Some(field) = field {
                    fields.insert(field, message.clone());
                }
                ApiError::BadRequest { message, fields }
            }
            Error::InvalidForm(fields) => ApiError::InvalidForm {
                message: "Please correct the highlighted fields".to_string(),
                fields,
            },
            Error::NotFound { entity, .. } => ApiError::NotFound(format!(
                "{} not found",
                capitalize(entity)
            )),
            Error::Forbidden(message) => ApiError::Forbidden(message),
            other => {
                tracing::error!(error = %other, "internal error");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            return ApiError::NotFound("Not found".to_string());
        }
        if err.is_permission_denied() {
            return ApiError::Forbidden("Unauthorized".to_string());
        }
        tracing::error!(error = %err, "store error");
        ApiError::internal("Internal server error")
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Api { status, message } if status < 500 => {
                match StatusCode::from_u16(status) {
                    Ok(StatusCode::UNAUTHORIZED) => ApiError::Unauthorized(message),
                    Ok(StatusCode::FORBIDDEN) => ApiError::Forbidden(message),
                    Ok(StatusCode::TOO_MANY_REQUESTS) => ApiError::QuotaExceeded(message),
                    _ => ApiError::bad_request(message),
                }
            }
            other if other.is_client_error() => ApiError::Unauthorized(other.to_string()),
            other => {
                tracing::error!(error = %other, "auth service error");
                ApiError::BadGateway("Authentication service unavailable".to_string())
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
