//! Challenge endpoints.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use biohub_core::listing::filter_challenges;
use biohub_core::model::Challenge;
use biohub_core::validate::{ChallengeDraft, ChallengeEdit};
use biohub_core::{CHALLENGES_PER_PAGE, ChallengeQuery, Page, paginate};
use biohub_store::SharedStore;
use chrono::Utc;
use http::StatusCode;
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

const CHALLENGE_NOT_FOUND: &str = "Challenge not found";
const UNAUTHORIZED: &str = "Unauthorized";

/// `GET /api/challenges?q&difficulty&page`
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ChallengeQuery>, QueryRejection>,
) -> Result<Json<Page<Challenge>>> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let challenges = state.store.list_challenges(None).await.map_err(|err| {
        tracing::error!(error = %err, "challenge listing failed");
        ApiError::internal("Failed to load challenges")
    })?;

    let matching = filter_challenges(challenges, &query);
    Ok(Json(paginate(
        matching,
        query.page.unwrap_or(1),
        CHALLENGES_PER_PAGE,
    )))
}

/// `GET /api/challenges/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Challenge>> {
    find_challenge(&state.store, &id).await.map(Json)
}

/// `POST /api/challenges`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(draft): JsonBody<ChallengeDraft>,
) -> Result<(StatusCode, Json<Challenge>)> {
    let new = draft.into_new_challenge(user.id.clone())?;
    let challenge = state
        .store_for(&user)
        .insert_challenge(&new)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "challenge insert failed");
            ApiError::internal("Failed to create challenge")
        })?;

    tracing::info!(challenge = %challenge.id, user = %user.id, "challenge posted");
    Ok((StatusCode::CREATED, Json(challenge)))
}

/// `PUT /api/challenges/{id}`
///
/// Only the creator may edit.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(edit): JsonBody<ChallengeEdit>,
) -> Result<Json<Challenge>> {
    let store = state.store_for(&user);
    let existing = find_challenge(&store, &id).await?;
    if existing.creator_id != user.id {
        return Err(ApiError::Forbidden(UNAUTHORIZED.into()));
    }

    let update = edit.into_update(Utc::now())?;
    let updated = store.update_challenge(&id, &update).await.map_err(|err| {
        if err.is_not_found() {
            return ApiError::NotFound(CHALLENGE_NOT_FOUND.into());
        }
        tracing::error!(challenge = %id, error = %err, "challenge update failed");
        ApiError::internal("Failed to update challenge")
    })?;

    Ok(Json(updated))
}

/// Reply to a successful delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

/// `DELETE /api/challenges/{id}`
///
/// Only the creator may delete.
pub async fn remove(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>> {
    let user = user.ok_or_else(|| ApiError::Unauthorized(UNAUTHORIZED.into()))?;
    let store = state.store_for(&user);

    let existing = find_challenge(&store, &id).await?;
    if existing.creator_id != user.id {
        return Err(ApiError::Forbidden(UNAUTHORIZED.into()));
    }

    store.delete_challenge(&id).await.map_err(|err| {
        tracing::error!(challenge = %id, error = %err, "challenge delete failed");
        ApiError::internal("Failed to delete challenge")
    })?;

    tracing::info!(challenge = %id, user = %user.id, "challenge deleted");
    Ok(Json(Deleted { success: true }))
}

async fn find_challenge(store: &SharedStore, id: &str) -> Result<Challenge> {
    match store.get_challenge(id).await {
        Ok(Some(challenge)) => Ok(challenge),
        Ok(None) => Err(ApiError::NotFound(CHALLENGE_NOT_FOUND.into())),
        Err(err) => {
            tracing::warn!(challenge = %id, error = %err, "challenge lookup failed");
            Err(ApiError::NotFound(CHALLENGE_NOT_FOUND.into()))
        }
    }
}
