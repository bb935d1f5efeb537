//! Session-scoped dataset and filter state with a memoized view.
//!
//! [`ObstacleSession`] owns everything one operator works with: the loaded
//! dataset ([`FeatureStore`]), the current filter ([`FilterState`]) and the
//! last computed [`FilteredView`]. Views are recomputed only when the dataset,
//! the parameters, the analytics options or the reference day change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FeatureCollection, FilterParameters, StatsSummary};
use crate::view::{compute_view, AnalyticsOptions, FilteredView};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Progress of the external fetch that fills a [`FeatureStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Holder of the immutable dataset.
///
/// Only complete collections are ever stored, so a load in flight never
/// exposes partial data. Without a collection the engines see an empty set.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    collection: Option<Arc<FeatureCollection>>,
    stats: Option<Arc<StatsSummary>>,
    state: LoadState,
    last_error: Option<String>,
    generation: u64,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Replace the dataset wholesale.
    pub fn complete(&mut self, collection: FeatureCollection, stats: Option<StatsSummary>) {
        self.collection = Some(Arc::new(collection));
        self.stats = stats.map(Arc::new);
        self.state = LoadState::Ready;
        self.last_error = None;
        self.generation = next_generation();
    }

    /// Record a failed fetch. A previously loaded dataset stays in place.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = LoadState::Failed;
        self.last_error = Some(error.into());
    }

    pub fn collection(&self) -> Option<&FeatureCollection> {
        self.collection.as_deref()
    }

    pub fn stats(&self) -> Option<&StatsSummary> {
        self.stats.as_deref()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Changes every time the dataset is replaced; 0 before the first load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn feature_count(&self) -> usize {
        self.collection.as_ref().map_or(0, |c| c.len())
    }
}

/// Current filter parameters and how often they actually changed.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    params: FilterParameters,
    revision: u64,
}

impl FilterState {
    pub fn params(&self) -> &FilterParameters {
        &self.params
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if the parameters differ from the current ones.
    pub fn set(&mut self, params: FilterParameters) -> bool {
        if params == self.params {
            return false;
        }
        self.params = params;
        self.revision += 1;
        true
    }
}

/// Exact snapshot of every input a memoized view was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewKey {
    generation: u64,
    params: FilterParameters,
    options: AnalyticsOptions,
    today: NaiveDate,
}

impl ViewKey {
    fn matches(
        &self,
        generation: u64,
        params: &FilterParameters,
        options: &AnalyticsOptions,
        today: NaiveDate,
    ) -> bool {
        self.generation == generation
            && self.today == today
            && &self.params == params
            && &self.options == options
    }
}

/// Injectable service object behind `compute_view`.
#[derive(Debug, Default)]
pub struct ObstacleSession {
    store: FeatureStore,
    filters: FilterState,
    options: AnalyticsOptions,
    memo: Option<(ViewKey, Arc<FilteredView>)>,
    recomputations: u64,
}

impl ObstacleSession {
    pub fn new(options: AnalyticsOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_store(store: FeatureStore, options: AnalyticsOptions) -> Self {
        Self {
            store,
            options,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FeatureStore {
        &mut self.store
    }

    /// Take over `store` if it holds a different dataset than ours.
    pub fn adopt(&mut self, store: &FeatureStore) -> bool {
        if store.generation() == self.store.generation() {
            return false;
        }
        tracing::debug!(
            "Session adopting dataset generation {} ({} features)",
            store.generation(),
            store.feature_count()
        );
        self.store = store.clone();
        true
    }

    pub fn params(&self) -> &FilterParameters {
        self.filters.params()
    }

    pub fn filter_revision(&self) -> u64 {
        self.filters.revision()
    }

    pub fn options(&self) -> &AnalyticsOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: AnalyticsOptions) {
        self.options = options;
    }

    pub fn set_params(&mut self, params: FilterParameters) -> bool {
        self.filters.set(params)
    }

    /// How many times a view was actually computed rather than served from memo.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Apply `params` and return the matching view.
    pub fn compute_view(&mut self, params: FilterParameters, today: NaiveDate) -> Arc<FilteredView> {
        self.set_params(params);
        self.current_view(today)
    }

    /// View for the current parameters, recomputed only when an input changed.
    pub fn current_view(&mut self, today: NaiveDate) -> Arc<FilteredView> {
        let generation = self.store.generation();
        if let Some((key, view)) = &self.memo {
            if key.matches(generation, self.filters.params(), &self.options, today) {
                return Arc::clone(view);
            }
        }

        let view = Arc::new(compute_view(
            self.store.collection(),
            self.store.stats(),
            self.filters.params(),
            &self.options,
            today,
        ));
        self.recomputations += 1;
        tracing::debug!(
            "Recomputed view: {} of {} features (filter revision {})",
            view.features.len(),
            self.store.feature_count(),
            self.filters.revision()
        );

        let key = ViewKey {
            generation,
            params: self.filters.params().clone(),
            options: self.options.clone(),
            today,
        };
        self.memo = Some((key, Arc::clone(&view)));
        view
    }
}
