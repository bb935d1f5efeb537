//! Aerovert CLI - command line access to the obstacle engine.
//!
//! - obstacle_view: filter a dataset and print its analytics

pub mod source;
pub mod summary;

pub use source::{load_dataset, DatasetLocation};
pub use summary::render_summary;
