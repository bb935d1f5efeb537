//! The filtered view handed to the presentation layer.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analytics::{
    self, CompositionEntry, CorrelationPoint, CriticalHazard, Kpis, RegionalRisk, SaturationBand,
    DEFAULT_CRITICAL_LIMIT, DEFAULT_REGIONAL_TOP_N,
};
use crate::filter;
use crate::models::{FeatureCollection, FilterParameters, ObstacleFeature, StatsSummary};

pub const DEFAULT_FRESHNESS_WINDOW_DAYS: u32 = 7;

/// Engine-side analytics knobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsOptions {
    pub freshness_window_days: u32,
    pub critical_limit: usize,
    pub regional_top_n: usize,
    /// Year for the monthly activity histogram; the reference day's year when unset
    pub activity_year: Option<i32>,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            freshness_window_days: DEFAULT_FRESHNESS_WINDOW_DAYS,
            critical_limit: DEFAULT_CRITICAL_LIMIT,
            regional_top_n: DEFAULT_REGIONAL_TOP_N,
            activity_year: None,
        }
    }
}

/// Filtered collection plus every analytics product derived from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredView {
    /// Version of the collection this view was computed from, if any
    pub collection_version: Option<u64>,
    pub reference_date: NaiveDate,
    pub features: Vec<Arc<ObstacleFeature>>,
    pub kpis: Kpis,
    pub compliance_score: u8,
    pub composition: Vec<CompositionEntry>,
    pub vertical_saturation: Vec<SaturationBand>,
    pub critical_hazards: Vec<CriticalHazard>,
    pub freshness_window_days: u32,
    pub freshness_count: usize,
    pub activity_year: i32,
    pub monthly_activity: [usize; 12],
    pub correlation: Vec<CorrelationPoint>,
    /// Ranked from the unfiltered stats summary, independent of the filter
    pub regional_risk: Vec<RegionalRisk>,
}

/// Run the filter and every analytic for one (collection, parameters) pair.
///
/// An absent collection is treated as empty.
pub fn compute_view(
    collection: Option<&FeatureCollection>,
    stats: Option<&StatsSummary>,
    params: &FilterParameters,
    options: &AnalyticsOptions,
    today: NaiveDate,
) -> FilteredView {
    let features = filter::apply_collection(collection, params);
    let activity_year = options.activity_year.unwrap_or_else(|| today.year());

    FilteredView {
        collection_version: collection.map(FeatureCollection::version),
        reference_date: today,
        kpis: analytics::kpis(&features),
        compliance_score: analytics::compliance_score(&features),
        composition: analytics::composition(&features),
        vertical_saturation: analytics::vertical_saturation(&features),
        critical_hazards: analytics::critical_hazards(&features, options.critical_limit),
        freshness_window_days: options.freshness_window_days,
        freshness_count: analytics::freshness_count(
            &features,
            options.freshness_window_days,
            today,
        ),
        activity_year,
        monthly_activity: analytics::monthly_activity(&features, activity_year),
        correlation: analytics::correlation_matrix(&features),
        regional_risk: analytics::regional_risk(stats, options.regional_top_n),
        features,
    }
}
