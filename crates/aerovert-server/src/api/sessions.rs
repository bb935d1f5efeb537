//! Filter session endpoints.
//!
//! A session holds one operator's filter parameters. Every read or update
//! returns the full filtered view for the session's current parameters.

use std::sync::Arc;

use aerovert_core::{FilterParameters, FilteredView};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
    pub view: Arc<FilteredView>,
}

/// Open a session. The body, if any, holds the initial filter parameters.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let params = initial_params(&body)?;
    let (session_id, view) = state.create_session(params);
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id, view })))
}

/// An empty body means defaults; anything else must be valid parameters.
fn initial_params(body: &[u8]) -> Result<Option<FilterParameters>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|err| ApiError::InvalidBody(err.to_string()))
}

pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Arc<FilteredView>>, ApiError> {
    state
        .session_view(&id, None)
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

pub async fn get_filters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FilterParameters>, ApiError> {
    state
        .session_params(&id)
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

/// Replace the session's parameters and return the recomputed view.
pub async fn update_filters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(params): Json<FilterParameters>,
) -> Result<Json<Arc<FilteredView>>, ApiError> {
    tracing::debug!("Session {} filters: {:?}", id, params);
    state
        .session_view(&id, Some(params))
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.remove_session(&id) {
        tracing::info!("Closed session {}", id);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
