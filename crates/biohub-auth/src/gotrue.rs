//! Client for the hosted auth service (`{url}/auth/v1`).

use serde::{Deserialize, Serialize};

use crate::AuthError;

/// A user as the auth service describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoTrueUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Tokens issued by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    pub user: GoTrueUser,
}

/// Result of a sign-up.
///
/// Projects that require email confirmation answer with the user only; the
/// session arrives after the confirmation link is followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    /// Signed up and signed in.
    Session(Session),
    /// Signed up; confirmation pending.
    ConfirmationSent(GoTrueUser),
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Error body of the auth service. Different endpoints use different keys.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Thin client for password auth against the hosted auth service.
#[derive(Clone)]
pub struct GoTrueClient {
    client: reqwest::Client,
    auth_url: String,
    anon_key: String,
}

impl std::fmt::Debug for GoTrueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueClient")
            .field("auth_url", &self.auth_url)
            .finish_non_exhaustive()
    }
}

impl GoTrueClient {
    /// Creates a client for the project at `url`.
    pub fn new(url: &str, anon_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url, anon_key)
    }

    /// Creates a client sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client, url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            client,
            auth_url: format!("{}/auth/v1", url.trim().trim_end_matches('/')),
            anon_key: anon_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.auth_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("auth service error")
                    .to_string()
            });
        Err(AuthError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("unreadable auth response: {e}")))
    }

    /// Signs in with email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .await?;
        Self::parse(Self::check(response).await?).await
    }

    /// Creates an account. The confirmation email links to `redirect_to`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let mut request = self
            .client
            .post(self.endpoint("signup"))
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password });
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }
        let response = request.send().await?;
        Self::parse(Self::check(response).await?).await
    }

    /// Revokes the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Looks up the user who owns `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<GoTrueUser, AuthError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::parse(Self::check(response).await?).await
    }
}
