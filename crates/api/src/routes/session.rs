//! Session, wishlist and speaker endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{BooleanMessage, SessionForm, SessionForms, StringMessage};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

/// POST /conference/{key}/sessions: organizer-only.
#[tracing::instrument(skip(state, identity, form))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(key): Path<String>,
    Json(form): Json<SessionForm>,
) -> Result<(StatusCode, Json<SessionForm>), ApiError> {
    let created = state.sessions.create_session(&identity, &key, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /conference/{key}/sessions
pub async fn by_conference(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<SessionForms>, ApiError> {
    Ok(Json(state.sessions.conference_sessions(&key).await?))
}

/// GET /conference/{key}/sessions/type/{type}
pub async fn by_conference_and_type(
    State(state): State<Arc<AppState>>,
    Path((key, type_of_session)): Path<(String, String)>,
) -> Result<Json<SessionForms>, ApiError> {
    Ok(Json(
        state
            .sessions
            .conference_sessions_by_type(&key, &type_of_session)
            .await?,
    ))
}

/// GET /sessions/speaker/{speaker}
pub async fn by_speaker(
    State(state): State<Arc<AppState>>,
    Path(speaker): Path<String>,
) -> Result<Json<SessionForms>, ApiError> {
    Ok(Json(state.sessions.sessions_by_speaker(&speaker).await?))
}

/// GET /sessions/finished
pub async fn finished(State(state): State<Arc<AppState>>) -> Result<Json<SessionForms>, ApiError> {
    Ok(Json(state.sessions.finished_sessions().await?))
}

/// GET /sessions/non-workshops-before-seven
pub async fn non_workshops_before_seven(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionForms>, ApiError> {
    Ok(Json(
        state.sessions.non_workshop_sessions_before_seven().await?,
    ))
}

/// GET /wishlist
pub async fn wishlist(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<SessionForms>, ApiError> {
    Ok(Json(state.sessions.wishlist(&identity).await?))
}

/// POST /wishlist/{key}
pub async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(key): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    Ok(Json(state.sessions.add_to_wishlist(&identity, &key).await?))
}

/// DELETE /wishlist/{key}
pub async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(key): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    Ok(Json(
        state.sessions.remove_from_wishlist(&identity, &key).await?,
    ))
}

/// GET /speaker/featured
pub async fn featured_speaker(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StringMessage>, ApiError> {
    Ok(Json(state.caches.featured_speaker().await?.into()))
}
