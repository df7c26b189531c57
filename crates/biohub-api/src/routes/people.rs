//! Dashboard and profile endpoints.

use axum::Json;
use axum::extract::State;
use biohub_core::quota::month_start;
use biohub_core::validate::{ProfileForm, ProfileState, clean_profile, default_profile};
use biohub_core::{DASHBOARD_LIMIT, PromptQuota};
use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;
use crate::view::Dashboard;

/// `GET /api/dashboard`
///
/// The five reads are independent and run together. Each one that fails is
/// logged and shown empty.
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Json<Dashboard> {
    let store = state.store_for(&user);
    let since = month_start(Utc::now());

    let (profile, colabs, open_colabs, challenges, used) = tokio::join!(
        store.get_profile(&user.id),
        store.list_member_colabs(&user.id),
        store.list_public_colabs(DASHBOARD_LIMIT),
        store.list_challenges(Some(DASHBOARD_LIMIT)),
        store.count_prompts_since(&user.id, since),
    );

    let warn = |what: &str, err: &dyn std::fmt::Display| {
        tracing::warn!(user = %user.id, error = %err, "dashboard {what} failed");
    };

    let profile = profile.unwrap_or_else(|err| {
        warn("profile", &err);
        None
    });
    let colabs = colabs.unwrap_or_else(|err| {
        warn("colabs", &err);
        Vec::new()
    });
    let open_colabs = open_colabs.unwrap_or_else(|err| {
        warn("open colabs", &err);
        Vec::new()
    });
    let challenges = challenges.unwrap_or_else(|err| {
        warn("challenges", &err);
        Vec::new()
    });
    let used = used.unwrap_or_else(|err| {
        warn("quota", &err);
        0
    });

    Json(Dashboard {
        profile,
        colabs,
        open_colabs,
        challenges,
        quota: PromptQuota::monthly(u32::try_from(used).unwrap_or(u32::MAX)).into(),
    })
}

/// `GET /api/profile`
///
/// A user who never saved a profile gets a generated default flagged
/// `is_new`.
pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileState>> {
    let stored = state
        .store_for(&user)
        .get_profile(&user.id)
        .await
        .map_err(|err| {
            tracing::error!(user = %user.id, error = %err, "profile lookup failed");
            ApiError::internal("Failed to load profile")
        })?;

    Ok(Json(match stored {
        Some(profile) => ProfileState {
            profile,
            is_new: false,
        },
        None => default_profile(&user.id, user.email.as_deref(), Utc::now()),
    }))
}

/// `PUT /api/profile`
///
/// The id is always the caller's, whatever the form says.
pub async fn save_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(mut form): JsonBody<ProfileForm>,
) -> Result<Json<ProfileState>> {
    form.id = Some(user.id.clone());
    let profile = clean_profile(form, Utc::now())?;

    let saved = state
        .store_for(&user)
        .upsert_profile(&profile)
        .await
        .map_err(|err| {
            tracing::error!(user = %user.id, error = %err, "profile save failed");
            ApiError::internal("Failed to save profile")
        })?;

    tracing::info!(user = %user.id, "profile saved");
    Ok(Json(ProfileState {
        profile: saved,
        is_new: false,
    }))
}
