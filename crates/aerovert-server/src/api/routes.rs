//! REST API routes.

use std::sync::Arc;

use aerovert_core::StatsSummary;
use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::error::ApiError;
use crate::api::sessions;
use crate::state::{AppState, DatasetStatus};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/dataset", get(get_dataset_status))
        .route("/v1/stats", get(get_stats))
        .route("/v1/sessions", post(sessions::create_session))
        .route("/v1/sessions/:id", delete(sessions::delete_session))
        .route("/v1/sessions/:id/view", get(sessions::get_view))
        .route(
            "/v1/sessions/:id/filters",
            get(sessions::get_filters).put(sessions::update_filters),
        )
}

/// Load state of the shared dataset.
async fn get_dataset_status(State(state): State<Arc<AppState>>) -> Json<DatasetStatus> {
    Json(state.dataset_status())
}

/// The unfiltered stats summary backing the regional ranking.
async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsSummary>, ApiError> {
    state
        .stats()
        .map(Json)
        .ok_or(ApiError::NotLoaded("stats summary"))
}
