//! Auth endpoints: a thin proxy to the hosted auth service, plus the page
//! route guard.

use axum::Json;
use axum::extract::{Query, State};
use biohub_auth::{GoTrueClient, GoTrueUser, GuardDecision, Session, SignUpOutcome, route_guard};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

/// Sign-in and sign-up body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Where the confirmation email should send the user (sign-up only).
    pub redirect_to: Option<String>,
}

impl Credentials {
    fn check(&self) -> Result<(&str, &str)> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ApiError::bad_request("Email and password are required"));
        }
        Ok((email, &self.password))
    }
}

/// Reply to a sign-up.
#[derive(Debug, Serialize)]
pub struct SignUpReply {
    pub user: GoTrueUser,
    /// Present when the account is usable immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    /// `true` when the user must follow the emailed link first.
    pub confirmation_sent: bool,
}

/// Reply to a sign-out.
#[derive(Debug, Serialize)]
pub struct SignedOut {
    pub success: bool,
}

fn auth_service(state: &AppState) -> Result<&GoTrueClient> {
    state
        .gotrue
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Authentication service not configured".into()))
}

/// `POST /api/auth/signin`
pub async fn sign_in(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<Session>> {
    let (email, password) = credentials.check()?;
    let session = auth_service(&state)?
        .sign_in_with_password(email, password)
        .await?;
    tracing::info!(user = %session.user.id, "signed in");
    Ok(Json(session))
}

/// `POST /api/auth/signup`
pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<SignUpReply>> {
    let (email, password) = credentials.check()?;
    let outcome = auth_service(&state)?
        .sign_up(email, password, credentials.redirect_to.as_deref())
        .await?;

    let reply = match outcome {
        SignUpOutcome::Session(session) => SignUpReply {
            user: session.user.clone(),
            session: Some(session),
            confirmation_sent: false,
        },
        SignUpOutcome::ConfirmationSent(user) => SignUpReply {
            user,
            session: None,
            confirmation_sent: true,
        },
    };
    tracing::info!(user = %reply.user.id, confirmation_sent = reply.confirmation_sent, "signed up");
    Ok(Json(reply))
}

/// `POST /api/auth/signout`
pub async fn sign_out(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<SignedOut>> {
    auth_service(&state)?.sign_out(&user.access_token).await?;
    tracing::info!(user = %user.id, "signed out");
    Ok(Json(SignedOut { success: true }))
}

/// `GET /api/auth/redirect` query.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedirectQuery {
    pub path: String,
    pub redirect_to: Option<String>,
}

/// `GET /api/auth/redirect?path&redirectTo`
///
/// Tells the front-end whether the page at `path` may be shown to the
/// caller or where to send them instead.
pub async fn redirect(
    user: Option<CurrentUser>,
    Query(query): Query<RedirectQuery>,
) -> Result<Json<GuardDecision>> {
    if !query.path.starts_with('/') {
        return Err(ApiError::bad_request("Path must start with '/'"));
    }
    Ok(Json(route_guard(
        &query.path,
        user.is_some(),
        query.redirect_to.as_deref(),
    )))
}
