//! Authenticated user identity and extraction helpers.

/// An authenticated user identity, extracted from a validated access token.
///
/// Stored in HTTP request extensions by the auth middleware. The access
/// token is kept so downstream calls can act as the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user's id (the token's `sub` claim).
    pub id: String,
    /// The user's email address, when the token carries one.
    pub email: Option<String>,
    /// The bearer token the request was authenticated with.
    pub access_token: String,
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &http::request::Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}
