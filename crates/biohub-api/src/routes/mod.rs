//! Route table.
//!
//! Routes that need a signed-in user sit behind a required [`AuthLayer`];
//! the rest get an optional one, so a valid token still identifies the
//! caller and an invalid one is still refused.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use biohub_auth::{AuthLayer, TokenValidator};

use crate::state::AppState;

pub mod ai;
pub mod auth;
pub mod challenges;
pub mod colab;
pub mod health;
pub mod people;

/// Builds the API router over `state`.
pub fn router(state: AppState) -> Router {
    let validator: Arc<dyn TokenValidator> = state.validator.clone();
    let auth = state.config.auth.clone();
    let required = AuthLayer::new(validator.clone(), auth.clone());
    let optional = AuthLayer::optional(validator, auth);

    let public = Router::new()
        .route("/api/literature-review", post(ai::literature_review))
        .route("/api/colab/{slug}", get(colab::show))
        .route("/api/challenges", get(challenges::list))
        .route("/api/challenges/{id}", get(challenges::show))
        .route("/api/auth/signin", post(auth::sign_in))
        .route("/api/auth/signup", post(auth::sign_up));

    let signed_in = Router::new()
        .route("/api/colab/{slug}/fork", post(colab::fork))
        .route("/api/colabs", post(colab::create))
        .route("/api/colab/{slug}/workspace", get(colab::workspace))
        .route("/api/colab/{slug}/contributions", post(colab::add_contribution))
        .route("/api/colab/{slug}/notes", post(colab::add_note))
        .route("/api/dashboard", get(people::dashboard))
        .route("/api/profile", get(people::profile).put(people::save_profile))
        .route("/api/challenges", post(challenges::create))
        .route("/api/challenges/{id}", put(challenges::update))
        .route("/api/auth/signout", post(auth::sign_out))
        .route_layer(required);

    let identified = Router::new()
        .route("/api/ai/ask", post(ai::ask))
        .route("/api/challenges/{id}", delete(challenges::remove))
        .route("/api/auth/redirect", get(auth::redirect))
        .route_layer(optional);

    Router::new()
        .route("/health", get(health::health))
        .merge(public)
        .merge(signed_in)
        .merge(identified)
        .with_state(state)
}
