//! Tower authentication middleware.
//!
//! `AuthLayer` and `AuthService` wrap any inner service with token validation.
//! In [`AuthMode::Required`] a request without a valid bearer token is
//! answered with 401. In [`AuthMode::Optional`] anonymous requests reach the
//! inner service without a user, but a token that fails validation is still
//! rejected.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::{Request, StatusCode};
use tower::{Layer, Service};

use crate::{AUTH_REQUIRED, AuthConfig, TokenValidator};

/// Whether a route needs a signed-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Required,
    Optional,
}

/// Tower `Layer` that wraps services with token authentication.
pub struct AuthLayer<V: TokenValidator + ?Sized> {
    validator: Arc<V>,
    config: AuthConfig,
    mode: AuthMode,
}

impl<V: TokenValidator + ?Sized> Clone for AuthLayer<V> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

impl<V: TokenValidator + ?Sized> AuthLayer<V> {
    /// Create a layer that requires a signed-in user.
    pub fn new(validator: Arc<V>, config: AuthConfig) -> Self {
        Self {
            validator,
            config,
            mode: AuthMode::Required,
        }
    }

    /// Create a layer that lets anonymous requests through.
    pub fn optional(validator: Arc<V>, config: AuthConfig) -> Self {
        Self {
            validator,
            config,
            mode: AuthMode::Optional,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }
}

impl<V: TokenValidator + ?Sized, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
///
/// On successful validation, inserts `AuthenticatedUser` into request
/// extensions where it's available to downstream handlers.
pub struct AuthService<V: TokenValidator + ?Sized, S> {
    inner: S,
    validator: Arc<V>,
    config: AuthConfig,
    mode: AuthMode,
}

impl<V: TokenValidator + ?Sized, S: Clone> Clone for AuthService<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            validator: self.validator.clone(),
            config: self.config.clone(),
            mode: self.mode,
        }
    }
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator + ?Sized,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let validator = self.validator.clone();
        let config = self.config.clone();
        let mode = self.mode;

        Box::pin(async move {
            // Auth disabled: no user is ever attached
            if !config.enabled {
                let resp = inner
                    .call(req)
                    .await
                    .unwrap_or_else(|infallible| match infallible {});
                return Ok(resp.into_response());
            }

            let token = match extract_bearer_token(&req) {
                Some(t) => t.to_string(),
                None if mode == AuthMode::Optional => {
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    return Ok(resp.into_response());
                }
                None => {
                    log::debug!("Rejecting {} {}: no bearer token", req.method(), req.uri().path());
                    return Ok(unauthorized_response());
                }
            };

            match validator.validate(&token, &config).await {
                Ok(user) => {
                    log::debug!("Authenticated user {}", user.id);
                    req.extensions_mut().insert(user);
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    Ok(resp.into_response())
                }
                Err(auth_err) if auth_err.is_client_error() => {
                    log::warn!("Authentication failed: {auth_err}");
                    Ok(unauthorized_response())
                }
                Err(auth_err) => {
                    log::error!("Token validation unavailable: {auth_err}");
                    Ok(error_response(StatusCode::SERVICE_UNAVAILABLE, &auth_err.to_string()))
                }
            }
        })
    }
}

/// Extract bearer token from the Authorization header.
pub(crate) fn extract_bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    let body = serde_json::json!({ "error": message });
    (
        status,
        [(http::header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response()
}

/// Build a 401 Unauthorized response with WWW-Authenticate header.
fn unauthorized_response() -> axum::response::Response {
    let mut response = error_response(StatusCode::UNAUTHORIZED, AUTH_REQUIRED);
    response.headers_mut().insert(
        http::header::WWW_AUTHENTICATE,
        http::HeaderValue::from_static("Bearer"),
    );
    response
}
