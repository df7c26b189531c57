//! Research-assistant endpoints.

use axum::Json;
use axum::extract::State;
use biohub_core::PromptQuota;
use biohub_core::model::AiPrompt;
use biohub_core::quota::month_start;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

/// `POST /api/ai/ask` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskRequest {
    pub prompt: Option<String>,
}

/// `POST /api/ai/ask` answer.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
}

/// `POST /api/literature-review` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewRequest {
    pub query: Option<String>,
    pub colab_context: Option<String>,
}

/// `POST /api/literature-review` answer.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review: String,
}

/// `POST /api/ai/ask`
///
/// Signed-in callers are held to the monthly prompt allowance and their
/// exchanges are logged. Anonymous callers are not counted.
pub async fn ask(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    JsonBody(body): JsonBody<AskRequest>,
) -> Result<Json<AskResponse>> {
    let prompt = body
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Prompt is required"))?;

    let store = user.as_ref().map(|u| (state.store_for(u), u));

    if let Some((store, user)) = &store {
        let used = match store.count_prompts_since(&user.id, month_start(Utc::now())).await {
            Ok(count) => u32::try_from(count).unwrap_or(u32::MAX),
            Err(err) => {
                tracing::warn!(user = %user.id, error = %err, "could not count prompts");
                0
            }
        };
        let quota = PromptQuota::monthly(used);
        if quota.is_exhausted() {
            tracing::info!(user = %user.id, used, "prompt quota exhausted");
            return Err(ApiError::QuotaExceeded(quota.exhausted_message()));
        }
    }

    let response = state.assistant.ask(&prompt).await.map_err(|err| {
        tracing::error!(error = %err, "assistant request failed");
        ApiError::internal("Failed to process your request")
    })?;

    if let Some((store, user)) = &store {
        let record = AiPrompt {
            user_id: user.id.clone(),
            prompt,
            response: response.clone(),
            model: state.assistant.model().to_string(),
            created_at: None,
        };
        if let Err(err) = store.record_prompt(&record).await {
            tracing::warn!(user = %user.id, error = %err, "could not record prompt");
        }
    }

    Ok(Json(AskResponse { response }))
}

/// `POST /api/literature-review`
pub async fn literature_review(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let query = body
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query is required"))?;

    let review = state
        .assistant
        .literature_review(&query, body.colab_context.as_deref())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "literature review failed");
            ApiError::internal("Failed to generate literature review")
        })?;

    Ok(Json(ReviewResponse { review }))
}
