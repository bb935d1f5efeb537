//! Obstacle filter pipeline.
//!
//! Predicates run in a fixed cost-ascending order and short-circuit on the
//! first failure. Surviving features keep their input order and are shared,
//! not copied.

use std::sync::Arc;

use crate::classifier::{is_hygienic, is_unlit};
use crate::models::{FeatureCollection, FilterParameters, ObstacleFeature};
use crate::rules::REGION_ALL;

/// Parameters with the per-call string work done once.
#[derive(Debug)]
struct PreparedFilter<'a> {
    params: &'a FilterParameters,
    region: Option<String>,
    search: Option<String>,
}

impl<'a> PreparedFilter<'a> {
    fn new(params: &'a FilterParameters) -> Self {
        // Blank and any casing of ALL both mean no region restriction
        let region = params.region_filter.trim();
        let region = if region.is_empty() || region.eq_ignore_ascii_case(REGION_ALL) {
            None
        } else {
            Some(region.to_uppercase())
        };
        let search = if params.search_term.is_empty() {
            None
        } else {
            Some(params.search_term.to_lowercase())
        };
        Self {
            params,
            region,
            search,
        }
    }

    fn matches(&self, feature: &ObstacleFeature) -> bool {
        if !is_hygienic(feature) {
            return false;
        }

        if let Some(region) = &self.region {
            if feature.region.to_uppercase() != *region {
                return false;
            }
        }

        if !self.params.active_types.contains(&feature.obstacle_type) {
            return false;
        }

        let height_ft = feature.max_height_ft();
        if height_ft < self.params.min_height_ft || height_ft > self.params.max_height_ft {
            return false;
        }

        if self.params.unlit_only && !is_unlit(feature) {
            return false;
        }

        if let Some(term) = &self.search {
            let hit = feature.description_text().to_lowercase().contains(term.as_str())
                || feature.id.to_lowercase().contains(term.as_str())
                || feature.region.to_lowercase().contains(term.as_str());
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Check a single feature against `params`.
pub fn matches(feature: &ObstacleFeature, params: &FilterParameters) -> bool {
    PreparedFilter::new(params).matches(feature)
}

/// Filter `features` with `params`, preserving order.
pub fn apply(
    features: &[Arc<ObstacleFeature>],
    params: &FilterParameters,
) -> Vec<Arc<ObstacleFeature>> {
    let prepared = PreparedFilter::new(params);
    features
        .iter()
        .filter(|feature| prepared.matches(feature))
        .cloned()
        .collect()
}

/// Filter a possibly absent collection. No collection behaves like an empty one.
pub fn apply_collection(
    collection: Option<&FeatureCollection>,
    params: &FilterParameters,
) -> Vec<Arc<ObstacleFeature>> {
    match collection {
        Some(collection) => apply(collection.features(), params),
        None => Vec::new(),
    }
}
