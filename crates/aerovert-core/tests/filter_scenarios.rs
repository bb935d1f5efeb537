//! End-to-end scenarios over a small obstacle collection.

use aerovert_core::analytics::{compliance_score, critical_hazards, kpis};
use aerovert_core::{
    compute_view, filter, AnalyticsOptions, FeatureCollection, FilterParameters, ObstacleFeature,
};
use chrono::NaiveDate;

fn scenario_collection() -> FeatureCollection {
    FeatureCollection::new(vec![
        ObstacleFeature::new("F0001/25", "WIND_TURBINE", 8.2, 53.4)
            .with_region("EDGG")
            .with_altitudes(Some(0), Some(15))
            .with_radius(0.5)
            .with_description("unlit turbine"),
        ObstacleFeature::new("F0002/25", "CRANE", 13.4, 52.5)
            .with_region("EDGG")
            .with_altitudes(Some(0), Some(8))
            .with_radius(0.2)
            .with_description("lit crane"),
        ObstacleFeature::new("F0003/25", "UNKNOWN", 11.5, 48.1)
            .with_region("EDGG")
            .with_altitudes(Some(0), Some(99))
            .with_radius(0.0),
    ])
}

fn ids(collection: &FeatureCollection, params: &FilterParameters) -> Vec<String> {
    filter::apply(collection.features(), params)
        .iter()
        .map(|f| f.id.clone())
        .collect()
}

#[test]
fn scenario_a_default_parameters() {
    let collection = scenario_collection();
    let params = FilterParameters::default();
    let filtered = filter::apply(collection.features(), &params);

    assert_eq!(ids(&collection, &params), vec!["F0001/25", "F0002/25"]);
    let k = kpis(&filtered);
    assert_eq!(k.total, 2);
    assert_eq!(k.unlit_count, 1);
    assert_eq!(k.vfr_conflict_count, 2);
    assert_eq!(compliance_score(&filtered), 50);
}

#[test]
fn scenario_b_unlit_only() {
    let collection = scenario_collection();
    let params = FilterParameters {
        unlit_only: true,
        ..FilterParameters::default()
    };
    let filtered = filter::apply(collection.features(), &params);

    assert_eq!(ids(&collection, &params), vec!["F0001/25"]);
    assert_eq!(compliance_score(&filtered), 0);
}

#[test]
fn scenario_c_unmatched_region() {
    let collection = scenario_collection();
    let params = FilterParameters {
        region_filter: "EDWW".to_string(),
        ..FilterParameters::default()
    };
    let filtered = filter::apply(collection.features(), &params);

    assert!(filtered.is_empty());
    assert_eq!(compliance_score(&filtered), 100);
    assert!(critical_hazards(&filtered, 15).is_empty());
}

#[test]
fn scenario_d_search_term() {
    let collection = scenario_collection();
    let params = FilterParameters {
        search_term: "crane".to_string(),
        ..FilterParameters::default()
    };
    assert_eq!(ids(&collection, &params), vec!["F0002/25"]);
}

#[test]
fn full_view_for_scenario_a() {
    let collection = scenario_collection();
    let view = compute_view(
        Some(&collection),
        None,
        &FilterParameters::default(),
        &AnalyticsOptions::default(),
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
    );

    assert_eq!(view.collection_version, Some(collection.version()));
    assert_eq!(view.features.len(), 2);
    assert_eq!(view.compliance_score, 50);
    assert_eq!(view.correlation.len(), 2);
    // Only the unlit turbine qualifies; neither feature is above FL20
    assert_eq!(view.critical_hazards.len(), 1);
    assert_eq!(view.critical_hazards[0].feature.id, "F0001/25");
    assert!(view.regional_risk.is_empty());
}

#[test]
fn unconstrained_filter_yields_hygienic_subset() {
    let mut features = scenario_collection()
        .features()
        .iter()
        .map(|f| (**f).clone())
        .collect::<Vec<_>>();
    features.push(
        ObstacleFeature::new("F0004/25", "BRIDGE", 0.0, 0.0)
            .with_altitudes(None, Some(3))
            .with_radius(1.0),
    );
    features.push(ObstacleFeature::new("F0005/25", "MAST", 0.0, 0.0).with_radius(4.0));
    let collection = FeatureCollection::new(features);

    let params = FilterParameters::default().with_all_types_of(&collection);
    assert_eq!(
        ids(&collection, &params),
        vec!["F0001/25", "F0002/25", "F0004/25"]
    );
}
