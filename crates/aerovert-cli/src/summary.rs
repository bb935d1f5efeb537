//! Plain-text rendering of a filtered view.

use std::fmt::Write;

use aerovert_core::analytics::HazardReason;
use aerovert_core::FilteredView;

fn reason_label(reason: HazardReason) -> &'static str {
    match reason {
        HazardReason::Unlit => "unlit",
        HazardReason::HighAltitude => "high",
        HazardReason::UnlitHighAltitude => "unlit+high",
    }
}

/// Short operator summary of a view.
pub fn render_summary(view: &FilteredView) -> String {
    let mut out = String::new();
    let kpis = &view.kpis;

    let _ = writeln!(out, "Obstacles in view: {}", kpis.total);
    let _ = writeln!(
        out,
        "  unlit {}  VFR conflicts {}  permanent {}",
        kpis.unlit_count, kpis.vfr_conflict_count, kpis.permanent_count
    );
    let _ = writeln!(out, "Lighting compliance: {}%", view.compliance_score);
    let _ = writeln!(
        out,
        "New in last {} days: {}",
        view.freshness_window_days, view.freshness_count
    );

    if !view.composition.is_empty() {
        let _ = writeln!(out, "Composition:");
        for entry in &view.composition {
            let _ = writeln!(out, "  {:<14} {}", format!("{:?}", entry.category), entry.count);
        }
    }

    let _ = writeln!(out, "Vertical saturation:");
    for band in &view.vertical_saturation {
        let _ = writeln!(
            out,
            "  {:<12} turbines {:>4}  other {:>4}",
            band.label, band.wind_turbines, band.other
        );
    }

    if view.critical_hazards.is_empty() {
        let _ = writeln!(out, "No critical hazards");
    } else {
        let _ = writeln!(out, "Critical hazards:");
        for hazard in &view.critical_hazards {
            let feature = &hazard.feature;
            let _ = writeln!(
                out,
                "  {:>2}. {} {} FL{:03} {} [{}]",
                hazard.rank,
                feature.id,
                feature.obstacle_type,
                feature.max_fl(),
                feature.region,
                reason_label(hazard.reason)
            );
        }
    }

    if !view.regional_risk.is_empty() {
        let _ = writeln!(out, "Busiest regions:");
        for risk in &view.regional_risk {
            let _ = writeln!(
                out,
                "  {}. {} {} ({:.1}%)",
                risk.rank, risk.region, risk.count, risk.share_pct
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerovert_core::{
        compute_view, AnalyticsOptions, FeatureCollection, FilterParameters, ObstacleFeature,
        StatsSummary,
    };
    use chrono::NaiveDate;

    #[test]
    fn summary_lists_hazards_and_regions() {
        let collection = FeatureCollection::new(vec![
            ObstacleFeature::new("F0001/25", "MAST", 8.0, 53.0)
                .with_region("EDWW")
                .with_altitudes(Some(0), Some(35)),
            ObstacleFeature::new("F0002/25", "CRANE", 8.1, 53.1)
                .with_region("EDWW")
                .with_altitudes(Some(0), Some(4))
                .with_description("lit crane"),
        ]);
        let stats = StatsSummary::from_features(collection.features());
        let view = compute_view(
            Some(&collection),
            Some(&stats),
            &FilterParameters::default(),
            &AnalyticsOptions::default(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );

        let text = render_summary(&view);
        assert!(text.contains("Obstacles in view: 2"));
        assert!(text.contains("F0001/25 MAST FL035 EDWW [high]"));
        assert!(text.contains("1. EDWW 2 (100.0%)"));
    }

    #[test]
    fn empty_view_reports_no_hazards() {
        let view = compute_view(
            None,
            None,
            &FilterParameters::default(),
            &AnalyticsOptions::default(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        let text = render_summary(&view);
        assert!(text.contains("Lighting compliance: 100%"));
        assert!(text.contains("No critical hazards"));
    }
}
