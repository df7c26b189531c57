//! Error types for biohub-store.

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while reading or writing rows.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// PostgREST error code (`PGRST116`, `23505`, ...), when given.
        code: Option<String>,
        /// Human-readable message from the backend.
        message: String,
    },

    /// The request never produced an answer.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The answer could not be decoded into the expected rows.
    #[error("failed to decode {table} rows: {source}")]
    Decode {
        /// Table that was queried.
        table: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A write targeted a row that does not exist.
    #[error("{table} row not found: {key}")]
    NotFound {
        /// Table that was written.
        table: &'static str,
        /// Key that matched nothing.
        key: String,
    },
}

impl StoreError {
    /// Creates a backend error.
    pub fn backend(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        StoreError::Backend {
            status,
            code,
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(table: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            table,
            key: key.into(),
        }
    }

    /// Whether the error means "no such row".
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::NotFound { .. } => true,
            StoreError::Backend { code, .. } => code.as_deref() == Some("PGRST116"),
            _ => false,
        }
    }

    /// Whether the backend refused the request for lack of rights.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            StoreError::Backend { status: 401 | 403, .. }
        ) || matches!(self, StoreError::Backend { code: Some(code), .. } if code == "42501")
    }
}
