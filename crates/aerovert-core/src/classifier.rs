//! Hazard predicates shared by the filter pipeline and the analytics.
//!
//! Every check here is total: missing fields are read through the defaults on
//! [`ObstacleFeature`], never treated as errors.

use crate::models::{ObstacleFeature, ObstacleType};
use crate::rules::{
    VerticalBand, MAX_HYGIENIC_RADIUS_NM, UNLIT_MARKERS, VFR_BAND_MAX_FL, VFR_BAND_MIN_FL,
};

/// Data hygiene gate: point-sized and of a known-or-free-form type.
///
/// Only the literal `UNKNOWN` tag is rejected; other unrecognized tags pass.
pub fn is_hygienic(feature: &ObstacleFeature) -> bool {
    feature.radius_nm() <= MAX_HYGIENIC_RADIUS_NM && feature.obstacle_type != ObstacleType::Unknown
}

/// Hazard lighting failure, inferred from the notice text.
pub fn is_unlit(feature: &ObstacleFeature) -> bool {
    description_is_unlit(feature.description_text())
}

pub(crate) fn description_is_unlit(text: &str) -> bool {
    let lowered = text.to_lowercase();
    UNLIT_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Top of the obstacle sits in the 500-2000 ft VFR cruise band.
pub fn is_vfr_conflict(feature: &ObstacleFeature) -> bool {
    (VFR_BAND_MIN_FL..=VFR_BAND_MAX_FL).contains(&feature.max_fl())
}

pub fn vertical_bucket(feature: &ObstacleFeature) -> VerticalBand {
    VerticalBand::from_fl(feature.max_fl())
}

/// Axis position for the type/altitude scatter. Not used for filtering.
pub fn type_ordinal(obstacle_type: &ObstacleType) -> u8 {
    match obstacle_type {
        ObstacleType::WindTurbine => 1,
        ObstacleType::Crane => 2,
        ObstacleType::Mast => 3,
        ObstacleType::Lights => 4,
        ObstacleType::Unknown | ObstacleType::Other(_) => 5,
    }
}
