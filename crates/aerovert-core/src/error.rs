//! Errors raised while decoding the external dataset resources.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a FeatureCollection, got {0:?}")]
    NotFeatureCollection(String),
}
