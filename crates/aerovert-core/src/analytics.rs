//! Risk analytics derived from a filtered obstacle set.
//!
//! Everything here is a pure function over its inputs. Empty input gives zero
//! counts, a 100% compliance score and empty lists.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::classifier::{is_unlit, is_vfr_conflict, type_ordinal, vertical_bucket};
use crate::models::{ObstacleFeature, ObstacleType, StatsSummary};
use crate::rules::{VerticalBand, CRITICAL_ALTITUDE_FL};

pub const DEFAULT_CRITICAL_LIMIT: usize = 15;
pub const DEFAULT_REGIONAL_TOP_N: usize = 3;

/// Headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total: usize,
    pub unlit_count: usize,
    pub vfr_conflict_count: usize,
    /// Features without an end of validity
    pub permanent_count: usize,
}

pub fn kpis(filtered: &[Arc<ObstacleFeature>]) -> Kpis {
    filtered.iter().fold(
        Kpis {
            total: filtered.len(),
            ..Kpis::default()
        },
        |mut acc, feature| {
            if is_unlit(feature) {
                acc.unlit_count += 1;
            }
            if is_vfr_conflict(feature) {
                acc.vfr_conflict_count += 1;
            }
            if feature.is_permanent() {
                acc.permanent_count += 1;
            }
            acc
        },
    )
}

/// Share of lit obstacles in percent, rounded. An empty set is fully compliant.
pub fn compliance_score(filtered: &[Arc<ObstacleFeature>]) -> u8 {
    let total = filtered.len();
    if total == 0 {
        return 100;
    }
    let unlit = filtered.iter().filter(|f| is_unlit(f)).count();
    let rate = 100.0 * (total - unlit) as f64 / total as f64;
    rate.round().clamp(0.0, 100.0) as u8
}

/// Display categories for the composition breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositionCategory {
    WindTurbine,
    Crane,
    Mast,
    Other,
}

impl CompositionCategory {
    const ORDER: [CompositionCategory; 4] = [
        CompositionCategory::WindTurbine,
        CompositionCategory::Crane,
        CompositionCategory::Mast,
        CompositionCategory::Other,
    ];

    fn of(obstacle_type: &ObstacleType) -> Self {
        match obstacle_type {
            ObstacleType::WindTurbine => Self::WindTurbine,
            ObstacleType::Crane => Self::Crane,
            ObstacleType::Mast => Self::Mast,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionEntry {
    pub category: CompositionCategory,
    pub count: usize,
}

/// Count per display category; categories with no features are left out.
pub fn composition(filtered: &[Arc<ObstacleFeature>]) -> Vec<CompositionEntry> {
    let mut counts = [0usize; 4];
    for feature in filtered {
        counts[CompositionCategory::of(&feature.obstacle_type) as usize] += 1;
    }
    CompositionCategory::ORDER
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| CompositionEntry {
            category: *category,
            count,
        })
        .collect()
}

/// One histogram bar of the vertical saturation view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaturationBand {
    pub band: VerticalBand,
    pub label: String,
    pub wind_turbines: usize,
    pub other: usize,
}

/// Five-band histogram, always fully populated and in band order.
pub fn vertical_saturation(filtered: &[Arc<ObstacleFeature>]) -> Vec<SaturationBand> {
    let mut bands: Vec<SaturationBand> = VerticalBand::ALL
        .iter()
        .map(|band| SaturationBand {
            band: *band,
            label: band.label().to_string(),
            wind_turbines: 0,
            other: 0,
        })
        .collect();

    for feature in filtered {
        let slot = &mut bands[vertical_bucket(feature).index()];
        if feature.obstacle_type == ObstacleType::WindTurbine {
            slot.wind_turbines += 1;
        } else {
            slot.other += 1;
        }
    }
    bands
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardReason {
    Unlit,
    HighAltitude,
    UnlitHighAltitude,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalHazard {
    /// 1-based position in the ranking
    pub rank: usize,
    pub reason: HazardReason,
    pub feature: Arc<ObstacleFeature>,
}

fn hazard_reason(feature: &ObstacleFeature) -> Option<HazardReason> {
    let unlit = is_unlit(feature);
    let high = feature.max_fl() > CRITICAL_ALTITUDE_FL;
    match (unlit, high) {
        (true, true) => Some(HazardReason::UnlitHighAltitude),
        (true, false) => Some(HazardReason::Unlit),
        (false, true) => Some(HazardReason::HighAltitude),
        (false, false) => None,
    }
}

/// Unlit or high obstacles, tallest first, at most `limit` of them.
///
/// Equal altitudes keep their collection order.
pub fn critical_hazards(filtered: &[Arc<ObstacleFeature>], limit: usize) -> Vec<CriticalHazard> {
    let mut candidates: Vec<(HazardReason, &Arc<ObstacleFeature>)> = filtered
        .iter()
        .filter_map(|feature| hazard_reason(feature).map(|reason| (reason, feature)))
        .collect();

    // sort_by is stable, which gives the order tie-break
    candidates.sort_by(|a, b| b.1.max_fl().cmp(&a.1.max_fl()));

    candidates
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (reason, feature))| CriticalHazard {
            rank: i + 1,
            reason,
            feature: Arc::clone(feature),
        })
        .collect()
}

/// Features that became valid on or after `today - window_days`.
pub fn freshness_count(
    filtered: &[Arc<ObstacleFeature>],
    window_days: u32,
    today: NaiveDate,
) -> usize {
    let cutoff = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN);
    filtered
        .iter()
        .filter_map(|feature| feature.valid_from)
        .filter(|from| from.date_naive() >= cutoff)
        .count()
}

/// Per-month count of features whose validity starts in `year` (Jan = 0).
pub fn monthly_activity(filtered: &[Arc<ObstacleFeature>], year: i32) -> [usize; 12] {
    let mut months = [0usize; 12];
    for from in filtered.iter().filter_map(|feature| feature.valid_from) {
        if from.year() == year {
            months[from.month0() as usize] += 1;
        }
    }
    months
}

/// One scatter point of the type/altitude matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPoint {
    pub id: String,
    pub type_ordinal: u8,
    pub max_altitude: i32,
    pub unlit: bool,
}

pub fn correlation_matrix(filtered: &[Arc<ObstacleFeature>]) -> Vec<CorrelationPoint> {
    filtered
        .iter()
        .map(|feature| CorrelationPoint {
            id: feature.id.clone(),
            type_ordinal: type_ordinal(&feature.obstacle_type),
            max_altitude: feature.max_fl(),
            unlit: is_unlit(feature),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalRisk {
    pub rank: usize,
    pub region: String,
    pub count: u64,
    /// Share of the dataset total, in percent
    pub share_pct: f64,
}

/// Busiest regions from the unfiltered stats summary.
///
/// This view does not depend on the filter: it ranks the precomputed
/// per-FIR counts of the whole dataset.
pub fn regional_risk(stats: Option<&StatsSummary>, top_n: usize) -> Vec<RegionalRisk> {
    let Some(stats) = stats else {
        return Vec::new();
    };

    let mut regions: Vec<_> = stats.by_fir.iter().collect();
    regions.sort_by(|a, b| b.value.cmp(&a.value));

    regions
        .into_iter()
        .take(top_n)
        .enumerate()
        .map(|(i, region)| RegionalRisk {
            rank: i + 1,
            region: region.name.clone(),
            count: region.value,
            share_pct: if stats.total == 0 {
                0.0
            } else {
                100.0 * region.value as f64 / stats.total as f64
            },
        })
        .collect()
}
