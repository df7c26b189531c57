//! Authentication primitives for BioHub.
//!
//! Provides:
//! - [`AuthenticatedUser`]: identity extracted from a validated access token
//! - [`TokenValidator`]: async token validation, with [`SupabaseTokenValidator`]
//!   for the hosted auth service
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware, required or optional
//! - [`GoTrueClient`]: sign-in, sign-up, sign-out, and user lookup
//! - [`route_guard`]: page-level redirect decisions
//! - [`AuthError`]: auth-specific error types

#![doc = include_str!("../README.md")]

mod error;
mod gotrue;
mod guard;
mod middleware;
mod supabase;
mod user;

pub use biohub_core::config::AuthConfig;
pub use error::AuthError;
pub use gotrue::{GoTrueClient, GoTrueUser, Session, SignUpOutcome};
pub use guard::{GuardDecision, is_guarded_path, route_guard};
pub use middleware::{AuthLayer, AuthMode, AuthService};
pub use supabase::SupabaseTokenValidator;
pub use user::{AuthenticatedUser, user_from_parts};

/// Message of every 401 the middleware sends.
pub const AUTH_REQUIRED: &str = "Authentication required";

/// Trait for validating tokens and extracting user identity.
///
/// The middleware calls `validate()` with the bearer token and stores the
/// returned user in the request extensions.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>,
    >;
}
