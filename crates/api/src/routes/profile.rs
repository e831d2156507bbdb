//! Profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use domain::{BooleanMessage, ProfileForm, ProfileMiniForm};

use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;

/// GET /profile: the caller's profile, created on first access.
pub async fn get(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<ProfileForm>, ApiError> {
    Ok(Json(state.profiles.get_profile(&identity).await?))
}

/// POST /profile
#[tracing::instrument(skip_all)]
pub async fn save(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(form): Json<ProfileMiniForm>,
) -> Result<Json<ProfileForm>, ApiError> {
    Ok(Json(state.profiles.save_profile(&identity, form).await?))
}

/// POST /profile/topics/{topic}
pub async fn add_topic(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(topic): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    Ok(Json(
        state.profiles.add_interested_topic(&identity, &topic).await?,
    ))
}

/// DELETE /profile/topics/{topic}
pub async fn remove_topic(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(topic): Path<String>,
) -> Result<Json<BooleanMessage>, ApiError> {
    Ok(Json(
        state
            .profiles
            .remove_interested_topic(&identity, &topic)
            .await?,
    ))
}
