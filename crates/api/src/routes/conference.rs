//! Conference, registration and search endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{BooleanMessage, ConferenceForm, ConferenceForms, ConferenceQueryForms, StringMessage};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

/// POST /conference: create a conference owned by the caller.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(form): Json<ConferenceForm>,
) -> Result<(StatusCode, Json<ConferenceForm>), ApiError> {
    let created = state.conferences.create_conference(&identity, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /conference/{key}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<ConferenceForm>, ApiError> {
    Ok(Json(state.conferences.get_conference(&key).await?))
}

/// PUT /conference/{key}: update a conference the caller owns.
#[tracing::instrument(skip(state, identity, form))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(key): Path<String>,
    Json(form): Json<ConferenceForm>,
) -> Result<Json<ConferenceForm>, ApiError> {
    Ok(Json(
        state.conferences.update_conference(&identity, &key, form).await?,
    ))
}

/// POST /conference/{key}/registration
#[tracing::instrument(skip(state, identity))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(key): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    Ok(Json(state.conferences.register(&identity, &key).await?))
}

/// DELETE /conference/{key}/registration
#[tracing::instrument(skip(state, identity))]
pub async fn unregister(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(key): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    Ok(Json(state.conferences.unregister(&identity, &key).await?))
}

/// POST /conferences/query: filtered search.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(forms): Json<ConferenceQueryForms>,
) -> Result<Json<ConferenceForms>, ApiError> {
    Ok(Json(state.conferences.query_conferences(&forms).await?))
}

/// GET /conferences/created
pub async fn created(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<ConferenceForms>, ApiError> {
    Ok(Json(state.conferences.conferences_created(&identity).await?))
}

/// GET /conferences/attending
pub async fn attending(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<ConferenceForms>, ApiError> {
    Ok(Json(state.conferences.conferences_to_attend(&identity).await?))
}

/// GET /conferences/topics: conferences matching the caller's interests.
pub async fn matching_topics(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<ConferenceForms>, ApiError> {
    Ok(Json(
        state
            .conferences
            .conferences_with_interested_topics(&identity)
            .await?,
    ))
}

/// GET /conference/announcement
pub async fn announcement(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StringMessage>, ApiError> {
    Ok(Json(state.caches.announcement().await?.into()))
}
