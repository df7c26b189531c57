//! Access-token validation for the hosted auth service.
//!
//! Tokens are HS256 JWTs signed with the project's JWT secret. When the
//! secret is configured they are verified locally; otherwise, or when the
//! token is not an HS256 JWT, the auth service is asked who the token
//! belongs to.

use std::future::Future;
use std::pin::Pin;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;

use crate::gotrue::GoTrueClient;
use crate::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};

/// Access-token claims.
#[derive(Debug, Deserialize)]
struct SupabaseClaims {
    sub: Option<String>,
    email: Option<String>,
}

/// Validator for access tokens issued by the hosted auth service.
pub struct SupabaseTokenValidator {
    jwt_secret: Option<String>,
    gotrue: Option<GoTrueClient>,
}

impl SupabaseTokenValidator {
    /// Create a validator that verifies locally with `jwt_secret` when given
    /// and asks `gotrue` otherwise.
    pub fn new(jwt_secret: Option<String>, gotrue: Option<GoTrueClient>) -> Self {
        Self {
            jwt_secret: jwt_secret.filter(|s| !s.is_empty()),
            gotrue,
        }
    }

    /// Create a validator that only verifies locally (for testing).
    #[cfg(test)]
    pub fn with_secret(secret: &str) -> Self {
        Self::new(Some(secret.to_string()), None)
    }

    async fn validate_token(
        &self,
        token: &str,
        audience: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        if let Some(secret) = &self.jwt_secret {
            match decode_header(token) {
                Ok(header) if header.alg == Algorithm::HS256 => {
                    return Self::validate_jwt(token, secret, audience);
                }
                Ok(header) => {
                    log::debug!("Token signed with {:?}, asking the auth service", header.alg);
                }
                Err(_) => {}
            }
        }

        log::debug!("Validating token with the auth service");
        self.validate_remote(token).await
    }

    fn validate_jwt(
        token: &str,
        secret: &str,
        audience: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        let token_data = decode::<SupabaseClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::InvalidAudience,
            _ => AuthError::InvalidSignature(e.to_string()),
        })?;

        let claims = token_data.claims;
        let id = claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSubject)?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email.filter(|e| !e.is_empty()),
            access_token: token.to_string(),
        })
    }

    async fn validate_remote(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let gotrue = self.gotrue.as_ref().ok_or_else(|| {
            AuthError::InvalidFormat("token cannot be verified without an auth service".to_string())
        })?;

        let user = gotrue.get_user(token).await.map_err(|e| match e {
            AuthError::Api { status, message } if status < 500 => AuthError::Rejected(message),
            other => other,
        })?;

        log::info!("Access token validated via auth service for {}", user.id);

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
            access_token: token.to_string(),
        })
    }
}

impl TokenValidator for SupabaseTokenValidator {
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let token = token.to_string();
        let audience = config.audience.clone();
        Box::pin(async move { self.validate_token(&token, &audience).await })
    }
}
