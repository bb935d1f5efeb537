//! Decoding of the feature-collection and stats resources.
//!
//! The feature resource is a GeoJSON `FeatureCollection` of `Point` features
//! whose properties use the upstream names (`fir`, `max_fl`, `text`, ...).
//! The camelCase names used elsewhere in the engine are accepted as aliases.
//! Individual malformed properties fall back to their defaults; only a
//! top-level shape mismatch is an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::DatasetError;
use crate::models::{
    normalize_region, Coordinate, FeatureCollection, ObstacleFeature, ObstacleType, StatsSummary,
};

#[derive(Debug, Deserialize)]
struct CollectionDto {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FeatureDto {
    #[serde(default)]
    geometry: Option<GeometryDto>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct GeometryDto {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Decode a feature collection, keeping input order.
pub fn parse_feature_collection(json: &str) -> Result<FeatureCollection, DatasetError> {
    let dto: CollectionDto = serde_json::from_str(json)?;
    match dto.kind.as_deref() {
        Some("FeatureCollection") => {}
        other => {
            return Err(DatasetError::NotFeatureCollection(
                other.unwrap_or("<missing>").to_string(),
            ))
        }
    }

    let total = dto.features.len();
    let features: Vec<ObstacleFeature> = dto
        .features
        .into_iter()
        .filter_map(decode_feature)
        .collect();

    let skipped = total - features.len();
    if skipped > 0 {
        tracing::warn!("Skipped {} features without a usable point geometry", skipped);
    }
    tracing::debug!("Decoded {} obstacle features", features.len());

    Ok(FeatureCollection::new(features))
}

/// Decode the precomputed stats summary.
pub fn parse_stats_summary(json: &str) -> Result<StatsSummary, DatasetError> {
    Ok(serde_json::from_str(json)?)
}

fn decode_feature(value: Value) -> Option<ObstacleFeature> {
    let dto: FeatureDto = serde_json::from_value(value).ok()?;
    let location = point_location(dto.geometry.as_ref()?)?;
    let props = dto.properties.unwrap_or_default();

    let obstacle_type = string_prop(&props, &["type", "obstacle_type"])
        .map(|tag| ObstacleType::parse(&tag))
        .unwrap_or(ObstacleType::Unknown);

    Some(ObstacleFeature {
        id: string_prop(&props, &["id", "notam_id"]).unwrap_or_default(),
        obstacle_type,
        region: normalize_region(string_prop(&props, &["fir", "region"]).as_deref()),
        min_altitude: int_prop(&props, &["min_fl", "minAltitude"]),
        max_altitude: int_prop(&props, &["max_fl", "maxAltitude"]),
        radius: float_prop(&props, &["radius", "radius_nm"]),
        description: string_prop(&props, &["text", "description"]),
        valid_from: string_prop(&props, &["start_date", "validFrom"])
            .and_then(|s| parse_datetime(&s)),
        valid_to: string_prop(&props, &["end_date", "validTo"]).and_then(|s| parse_datetime(&s)),
        location,
    })
}

fn point_location(geometry: &GeometryDto) -> Option<Coordinate> {
    if geometry.kind != "Point" {
        return None;
    }
    let coords = geometry.coordinates.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    Some(Coordinate { lon, lat })
}

fn lookup<'a>(props: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| props.get(*key))
        .find(|value| !value.is_null())
}

fn string_prop(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match lookup(props, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn float_prop(props: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match lookup(props, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn int_prop(props: &Map<String, Value>, keys: &[&str]) -> Option<i32> {
    let value = float_prop(props, keys)?;
    if value.is_finite() && value.abs() <= f64::from(i32::MAX) {
        Some(value.round() as i32)
    } else {
        None
    }
}

/// Accepts RFC 3339, naive ISO datetimes (read as UTC) and plain dates.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
