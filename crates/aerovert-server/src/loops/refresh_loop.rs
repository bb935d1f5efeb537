//! Dataset refresh loop.
//!
//! Loads the obstacle dataset at startup and replaces it on a fixed interval.
//! Failed fetches are retried with exponential backoff while the previously
//! loaded dataset (if any) keeps being served.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::backoff::RetryBackoff;
use crate::state::AppState;
use crate::upstream::DatasetSource;

const RETRY_BASE_SECS: u64 = 2;

/// Fetch once and install the result. Returns whether the fetch succeeded.
pub async fn refresh_once(state: &AppState, source: &DatasetSource) -> bool {
    state.begin_load();
    match source.fetch().await {
        Ok(dataset) => {
            state.finish_load(dataset);
            true
        }
        Err(err) => {
            tracing::warn!("Dataset refresh from {} failed: {:#}", source.describe(), err);
            state.fail_load(format!("{:#}", err));
            false
        }
    }
}

/// Start the refresh loop.
pub async fn run_refresh_loop(
    state: Arc<AppState>,
    source: DatasetSource,
    refresh_interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let retry_max = refresh_interval.max(Duration::from_secs(RETRY_BASE_SECS));
    let mut backoff = RetryBackoff::new(Duration::from_secs(RETRY_BASE_SECS), retry_max);

    tracing::info!(
        "Refreshing obstacles from {} every {:?}",
        source.describe(),
        refresh_interval
    );

    loop {
        let delay = if refresh_once(&state, &source).await {
            backoff.reset();
            refresh_interval
        } else {
            let delay = backoff.fail();
            tracing::info!(
                "Retrying dataset refresh in {:?} (attempt {})",
                delay,
                backoff.failures() + 1
            );
            delay
        };

        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Refresh loop shutting down");
                break;
            }
            _ = sleep(delay) => {}
        }
    }
}
