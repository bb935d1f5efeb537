//! Local rendition of the upstream stats aggregate.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{ObstacleFeature, RegionCount, StatsSummary};
use crate::rules::{UNKNOWN_REGION, VFR_BAND_MAX_FL, VFR_BAND_MIN_FL};

/// Number of regions the upstream summary reports.
pub const TOP_FIR_COUNT: usize = 5;

pub const VERTICAL_LOW: &str = "Low (<500ft)";
pub const VERTICAL_MID: &str = "Mid (500-2k ft)";
pub const VERTICAL_HIGH: &str = "High (>2k ft)";

impl StatsSummary {
    /// Aggregate an unfiltered feature list the way the stats resource does:
    /// totals, counts per raw type tag, the five busiest FIRs and a
    /// low/mid/high split on `maxAltitude`.
    ///
    /// Features without a FIR are left out of the regional ranking, and a
    /// missing `maxAltitude` lands in the high zone, as upstream does.
    pub fn from_features(features: &[Arc<ObstacleFeature>]) -> Self {
        let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
        let mut vertical: BTreeMap<String, u64> = BTreeMap::new();
        // Insertion-ordered so equal counts keep first-seen order after the sort
        let mut firs: Vec<RegionCount> = Vec::new();

        for feature in features {
            *by_type
                .entry(feature.obstacle_type.as_str().to_string())
                .or_insert(0) += 1;

            if feature.region != UNKNOWN_REGION {
                match firs.iter_mut().find(|r| r.name == feature.region) {
                    Some(entry) => entry.value += 1,
                    None => firs.push(RegionCount {
                        name: feature.region.clone(),
                        value: 1,
                    }),
                }
            }

            let zone = match feature.max_altitude {
                Some(fl) if fl < VFR_BAND_MIN_FL => VERTICAL_LOW,
                Some(fl) if fl <= VFR_BAND_MAX_FL => VERTICAL_MID,
                _ => VERTICAL_HIGH,
            };
            *vertical.entry(zone.to_string()).or_insert(0) += 1;
        }

        firs.sort_by(|a, b| b.value.cmp(&a.value));
        firs.truncate(TOP_FIR_COUNT);

        Self {
            total: features.len() as u64,
            by_type,
            by_fir: firs,
            vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(id: &str, kind: &str, region: &str, max_fl: i32) -> Arc<ObstacleFeature> {
        Arc::new(
            ObstacleFeature::new(id, kind, 0.0, 0.0)
                .with_region(region)
                .with_altitudes(None, Some(max_fl)),
        )
    }

    #[test]
    fn aggregates_like_upstream() {
        let features = vec![
            feature("1", "CRANE", "EDGG", 2),
            feature("2", "CRANE", "EDWW", 12),
            feature("3", "WIND_TURBINE", "EDWW", 25),
            feature("4", "UNKNOWN", "EDMM", 20),
        ];
        let stats = StatsSummary::from_features(&features);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_type["CRANE"], 2);
        assert_eq!(stats.by_type["UNKNOWN"], 1);
        assert_eq!(stats.by_fir[0], RegionCount { name: "EDWW".into(), value: 2 });
        assert_eq!(stats.by_fir[1].name, "EDGG");
        assert_eq!(stats.vertical[VERTICAL_LOW], 1);
        assert_eq!(stats.vertical[VERTICAL_MID], 2);
        assert_eq!(stats.vertical[VERTICAL_HIGH], 1);
    }

    #[test]
    fn keeps_only_top_five_regions() {
        let features: Vec<_> = (0..7)
            .map(|i| feature(&i.to_string(), "MAST", &format!("ED{i:02}"), 1))
            .collect();
        let stats = StatsSummary::from_features(&features);
        assert_eq!(stats.by_fir.len(), TOP_FIR_COUNT);
        assert_eq!(stats.by_fir[0].name, "ED00");
    }

    #[test]
    fn regionless_features_stay_out_of_the_ranking() {
        let mut features: Vec<_> = (0..3)
            .map(|i| {
                Arc::new(
                    ObstacleFeature::new(i.to_string(), "CRANE", 0.0, 0.0)
                        .with_altitudes(None, Some(3)),
                )
            })
            .collect();
        features.push(feature("edww-1", "MAST", "edww", 3));

        let stats = StatsSummary::from_features(&features);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_fir, vec![RegionCount { name: "EDWW".into(), value: 1 }]);

        let ranked = crate::analytics::regional_risk(Some(&stats), 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].region, "EDWW");
    }

    #[test]
    fn missing_max_altitude_counts_as_high() {
        let features = vec![
            Arc::new(ObstacleFeature::new("1", "CRANE", 0.0, 0.0).with_region("EDGG")),
            feature("2", "CRANE", "EDGG", 0),
        ];
        let stats = StatsSummary::from_features(&features);
        assert_eq!(stats.vertical[VERTICAL_HIGH], 1);
        assert_eq!(stats.vertical[VERTICAL_LOW], 1);
    }
}
