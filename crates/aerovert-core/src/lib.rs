//! Aerovert core: obstacle filtering and hazard analytics.
//!
//! A pure pipeline over an immutable obstacle collection. [`filter::apply`]
//! narrows the collection with the operator's [`FilterParameters`], the
//! [`analytics`] functions derive risk metrics from the result, and
//! [`ObstacleSession`] ties both together behind a memoized `compute_view`.

pub mod analytics;
pub mod classifier;
pub mod error;
pub mod filter;
pub mod geojson;
pub mod models;
pub mod rules;
pub mod session;
pub mod stats;
pub mod view;

pub use analytics::{
    CompositionCategory, CompositionEntry, CorrelationPoint, CriticalHazard, HazardReason, Kpis,
    RegionalRisk, SaturationBand,
};
pub use classifier::{is_hygienic, is_unlit, is_vfr_conflict, type_ordinal, vertical_bucket};
pub use error::DatasetError;
pub use geojson::{parse_feature_collection, parse_stats_summary};
pub use models::{
    Coordinate, FeatureCollection, FilterParameters, ObstacleFeature, ObstacleType, RegionCount,
    StatsSummary,
};
pub use rules::VerticalBand;
pub use session::{FeatureStore, FilterState, LoadState, ObstacleSession};
pub use view::{compute_view, AnalyticsOptions, FilteredView};
