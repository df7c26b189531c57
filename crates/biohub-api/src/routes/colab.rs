//! Colab endpoints.

use axum::Json;
use axum::extract::{Path, State};
use biohub_core::model::{
    Colab, ColabCounters, ColabMember, Contribution, MemberRole, MemberStatus, NewColab,
    NewContribution, NewResearchNote, ProfileSummary, ResearchNote,
};
use biohub_core::validate::{ColabDraft, entry_text};
use biohub_core::{fork_name, fork_slug};
use biohub_store::{SharedStore, StoreError};
use chrono::Utc;
use http::StatusCode;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;
use crate::view::{ColabPage, ForkedColab, Workspace};

const COLAB_NOT_FOUND: &str = "Colab not found";

/// `GET /api/colab/{slug}`
///
/// Counts the visit. A failed counter update is logged and the page is
/// served anyway.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ColabPage>> {
    let view = match state.store.get_colab_view(&slug).await {
        Ok(Some(view)) => view,
        Ok(None) => return Err(ApiError::NotFound(COLAB_NOT_FOUND.into())),
        Err(err) => {
            tracing::warn!(%slug, error = %err, "colab lookup failed");
            return Err(ApiError::NotFound(COLAB_NOT_FOUND.into()));
        }
    };

    let views = view.colab.views;
    let counters = ColabCounters {
        views: Some(views + 1),
        forks: None,
        updated_at: Utc::now(),
    };
    if let Err(err) = state
        .store
        .update_colab_counters(&view.colab.id, &counters)
        .await
    {
        tracing::warn!(%slug, error = %err, "could not count colab view");
    }

    Ok(Json(ColabPage::from_view(view, views)))
}

/// `POST /api/colab/{slug}/fork`
pub async fn fork(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<ForkedColab>> {
    let store = state.store_for(&user);
    let original = find_colab(&store, &slug).await?;

    let now = Utc::now();
    let new = NewColab {
        name: fork_name(&original.name),
        slug: fork_slug(&original.slug, now.timestamp_millis()),
        description: original.description.clone(),
        readme: original.readme.clone(),
        owner_id: user.id.clone(),
        is_public: true,
        visibility: Some("public".to_string()),
        forked_from: Some(original.id.clone()),
        tags: original.tags.clone(),
    };

    let forked = store.insert_colab(&new).await.map_err(|err| {
        tracing::error!(%slug, error = %err, "fork insert failed");
        ApiError::internal("Failed to fork colab")
    })?;

    let counters = ColabCounters {
        views: None,
        forks: Some(original.forks + 1),
        updated_at: now,
    };
    if let Err(err) = store.update_colab_counters(&original.id, &counters).await {
        tracing::warn!(%slug, error = %err, "could not count fork");
    }

    tracing::info!(from = %original.slug, to = %forked.slug, user = %user.id, "colab forked");
    Ok(Json(forked.into()))
}

/// `POST /api/colabs`
///
/// The creator becomes the accepted owner of the new colab.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(draft): JsonBody<ColabDraft>,
) -> Result<(StatusCode, Json<Colab>)> {
    let new = draft.into_new_colab(user.id.clone())?;
    let store = state.store_for(&user);

    let colab = store.insert_colab(&new).await.map_err(|err| match err {
        StoreError::Backend { status: 409, .. } => {
            ApiError::Conflict("A colab with this name already exists".into())
        }
        other => {
            tracing::error!(error = %other, "colab insert failed");
            ApiError::internal("Failed to create colab")
        }
    })?;

    let owner = ColabMember {
        colab_id: colab.id.clone(),
        user_id: user.id.clone(),
        role: MemberRole::Owner,
        status: MemberStatus::Accepted,
    };
    if let Err(err) = store.add_member(&owner).await {
        tracing::warn!(colab = %colab.slug, error = %err, "could not add owner membership");
    }

    tracing::info!(colab = %colab.slug, user = %user.id, "colab created");
    Ok((StatusCode::CREATED, Json(colab)))
}

/// `GET /api/colab/{slug}/workspace`
///
/// Loads the colab, then its creator, the caller's role, contributions,
/// and notes, one after another. Only a missing colab fails the request;
/// every later step degrades to an empty value.
pub async fn workspace(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<Workspace>> {
    let store = state.store_for(&user);
    let colab = find_colab(&store, &slug).await?;

    let creator: Option<ProfileSummary> = match store.get_profile(&colab.owner_id).await {
        Ok(profile) => profile.as_ref().map(Into::into),
        Err(err) => {
            tracing::warn!(%slug, error = %err, "creator lookup failed");
            None
        }
    };

    let role = store
        .member_role(&colab.id, &user.id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(%slug, error = %err, "role lookup failed");
            None
        });

    let contributions = store
        .list_contributions(&colab.id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(%slug, error = %err, "contributions lookup failed");
            Vec::new()
        });

    let notes = store
        .list_research_notes(&colab.id)
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(%slug, error = %err, "notes lookup failed");
            Vec::new()
        });

    Ok(Json(Workspace {
        colab,
        creator,
        role,
        contributions,
        notes,
    }))
}

/// `POST /api/colab/{slug}/contributions` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContributionForm {
    pub description: String,
}

/// `POST /api/colab/{slug}/notes` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NoteForm {
    pub content: String,
}

/// `POST /api/colab/{slug}/contributions`
pub async fn add_contribution(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
    JsonBody(form): JsonBody<ContributionForm>,
) -> Result<(StatusCode, Json<Contribution>)> {
    let description = entry_text("description", &form.description)?;
    let store = state.store_for(&user);
    let colab = find_colab(&store, &slug).await?;

    let contribution = store
        .insert_contribution(&NewContribution {
            colab_id: colab.id,
            user_id: user.id.clone(),
            description,
        })
        .await
        .map_err(|err| {
            tracing::error!(%slug, error = %err, "contribution insert failed");
            ApiError::internal("Failed to add contribution")
        })?;

    Ok((StatusCode::CREATED, Json(contribution)))
}

/// `POST /api/colab/{slug}/notes`
pub async fn add_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
    JsonBody(form): JsonBody<NoteForm>,
) -> Result<(StatusCode, Json<ResearchNote>)> {
    let content = entry_text("content", &form.content)?;
    let store = state.store_for(&user);
    let colab = find_colab(&store, &slug).await?;

    let note = store
        .insert_research_note(&NewResearchNote {
            colab_id: colab.id,
            user_id: user.id.clone(),
            content,
        })
        .await
        .map_err(|err| {
            tracing::error!(%slug, error = %err, "note insert failed");
            ApiError::internal("Failed to add note")
        })?;

    Ok((StatusCode::CREATED, Json(note)))
}

async fn find_colab(store: &SharedStore, slug: &str) -> Result<Colab> {
    match store.get_colab_by_slug(slug).await {
        Ok(Some(colab)) => Ok(colab),
        Ok(None) => Err(ApiError::NotFound(COLAB_NOT_FOUND.into())),
        Err(err) => {
            tracing::warn!(%slug, error = %err, "colab lookup failed");
            Err(ApiError::NotFound(COLAB_NOT_FOUND.into()))
        }
    }
}
