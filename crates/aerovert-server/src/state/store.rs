//! Shared dataset plus per-operator sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use aerovert_core::{
    AnalyticsOptions, FeatureStore, FilterParameters, FilteredView, LoadState, ObstacleSession,
    StatsSummary,
};
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::upstream::Dataset;

/// Snapshot of the dataset load state for `/v1/dataset`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStatus {
    pub state: LoadState,
    pub generation: u64,
    pub collection_version: Option<u64>,
    pub feature_count: usize,
    pub last_error: Option<String>,
    pub session_count: usize,
}

struct SessionSlot {
    session: ObstacleSession,
    /// Value of the access clock at the last touch
    last_used: u64,
}

/// Application state: one shared dataset, many filter sessions.
///
/// Each session sits behind its own mutex, so recomputation for a session is
/// serialized and always runs against the parameters stored last.
pub struct AppState {
    dataset: RwLock<FeatureStore>,
    sessions: DashMap<String, Mutex<SessionSlot>>,
    access_clock: AtomicU64,
    analytics: AnalyticsOptions,
    max_sessions: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            dataset: RwLock::new(FeatureStore::new()),
            sessions: DashMap::new(),
            access_clock: AtomicU64::new(0),
            analytics: config.analytics.clone(),
            max_sessions: config.max_sessions.max(1),
        }
    }

    fn tick(&self) -> u64 {
        self.access_clock.fetch_add(1, Ordering::Relaxed)
    }

    fn dataset_snapshot(&self) -> FeatureStore {
        self.dataset
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn with_dataset<R>(&self, f: impl FnOnce(&mut FeatureStore) -> R) -> R {
        let mut store = self
            .dataset
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut store)
    }

    pub fn begin_load(&self) {
        self.with_dataset(FeatureStore::begin_load);
    }

    /// Install a freshly fetched dataset. Sessions pick it up on their next view.
    pub fn finish_load(&self, dataset: Dataset) {
        let count = dataset.collection.len();
        self.with_dataset(|store| store.complete(dataset.collection, Some(dataset.stats)));
        tracing::info!("Dataset ready with {} obstacles", count);
    }

    pub fn fail_load(&self, error: impl Into<String>) {
        self.with_dataset(|store| store.fail(error));
    }

    pub fn dataset_status(&self) -> DatasetStatus {
        let store = self.dataset_snapshot();
        DatasetStatus {
            state: store.state(),
            generation: store.generation(),
            collection_version: store.collection().map(|c| c.version()),
            feature_count: store.feature_count(),
            last_error: store.last_error().map(str::to_string),
            session_count: self.sessions.len(),
        }
    }

    pub fn stats(&self) -> Option<StatsSummary> {
        self.dataset_snapshot().stats().cloned()
    }

    /// Open a session, optionally with initial parameters, and return its first view.
    pub fn create_session(&self, params: Option<FilterParameters>) -> (String, Arc<FilteredView>) {
        self.evict_idle_sessions();

        let mut session =
            ObstacleSession::with_store(self.dataset_snapshot(), self.analytics.clone());
        if let Some(params) = params {
            session.set_params(params);
        }
        let view = session.current_view(Utc::now().date_naive());

        let id = Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            Mutex::new(SessionSlot {
                session,
                last_used: self.tick(),
            }),
        );
        tracing::info!("Opened session {} ({} active)", id, self.sessions.len());
        (id, view)
    }

    /// View for a session, replacing its parameters first when given.
    pub fn session_view(
        &self,
        id: &str,
        params: Option<FilterParameters>,
    ) -> Option<Arc<FilteredView>> {
        let dataset = self.dataset_snapshot();
        let entry = self.sessions.get(id)?;
        let mut slot = entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        slot.last_used = self.tick();
        slot.session.adopt(&dataset);
        if let Some(params) = params {
            slot.session.set_params(params);
        }
        Some(slot.session.current_view(Utc::now().date_naive()))
    }

    /// Current parameters of a session.
    pub fn session_params(&self, id: &str) -> Option<FilterParameters> {
        let entry = self.sessions.get(id)?;
        let slot = entry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(slot.session.params().clone())
    }

    pub fn remove_session(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop least recently used sessions until there is room for one more.
    fn evict_idle_sessions(&self) {
        if self.sessions.len() < self.max_sessions {
            return;
        }

        let mut entries: Vec<(String, u64)> = self
            .sessions
            .iter()
            .map(|entry| {
                let last_used = entry
                    .value()
                    .lock()
                    .map(|slot| slot.last_used)
                    .unwrap_or_else(|poisoned| poisoned.into_inner().last_used);
                (entry.key().clone(), last_used)
            })
            .collect();
        entries.sort_by_key(|(_, last_used)| *last_used);

        for (id, _) in entries {
            if self.sessions.len() < self.max_sessions {
                break;
            }
            self.sessions.remove(&id);
            tracing::debug!("Evicted idle session {}", id);
        }
    }
}
