//! HTTP API for the obstacle engine.

pub mod error;
mod routes;
pub mod sessions;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

#[cfg(test)]
mod tests;
