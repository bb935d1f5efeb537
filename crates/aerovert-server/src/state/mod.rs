//! Server state.

pub mod store;

pub use store::{AppState, DatasetStatus};
