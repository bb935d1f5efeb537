//! Core data models for the obstacle engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::rules::{DEFAULT_MAX_HEIGHT_FT, REGION_ALL, UNKNOWN_REGION};

/// Obstacle category tag.
///
/// The ingestion layer does not close the set of tags, so anything that is not
/// one of the known categories (or the literal `UNKNOWN`) is kept verbatim in
/// [`ObstacleType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObstacleType {
    WindTurbine,
    Crane,
    Mast,
    Lights,
    Unknown,
    Other(String),
}

impl ObstacleType {
    /// The types an operator sees as toggles by default.
    pub const KNOWN: [ObstacleType; 4] = [
        ObstacleType::WindTurbine,
        ObstacleType::Crane,
        ObstacleType::Mast,
        ObstacleType::Lights,
    ];

    /// Parse a raw tag. Upstream emits `WIND TURBINE` with a space, so
    /// whitespace is folded to `_` before matching the known tags.
    pub fn parse(tag: &str) -> Self {
        let trimmed = tag.trim();
        match trimmed.replace(' ', "_").as_str() {
            "WIND_TURBINE" => Self::WindTurbine,
            "CRANE" => Self::Crane,
            "MAST" => Self::Mast,
            "LIGHTS" => Self::Lights,
            "UNKNOWN" => Self::Unknown,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::WindTurbine => "WIND_TURBINE",
            Self::Crane => "CRANE",
            Self::Mast => "MAST",
            Self::Lights => "LIGHTS",
            Self::Unknown => "UNKNOWN",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ObstacleType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for ObstacleType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ObstacleType> for String {
    fn from(value: ObstacleType) -> Self {
        match value {
            ObstacleType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ObstacleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WGS84 point, longitude first as in GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

/// One obstacle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleFeature {
    /// Notice reference, e.g. `F0153/25`
    pub id: String,
    #[serde(rename = "type")]
    pub obstacle_type: ObstacleType,
    /// FIR code, stored upper-cased
    #[serde(default = "unknown_region", deserialize_with = "deserialize_region")]
    pub region: String,
    /// Lower limit in flight levels (1 FL = 100 ft)
    #[serde(default)]
    pub min_altitude: Option<i32>,
    /// Upper limit in flight levels
    #[serde(default)]
    pub max_altitude: Option<i32>,
    /// Horizontal influence radius in nautical miles
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    /// Absent means the obstacle is permanent
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
    pub location: Coordinate,
}

impl ObstacleFeature {
    /// Create a feature with only the required fields.
    pub fn new(
        id: impl Into<String>,
        obstacle_type: impl Into<ObstacleType>,
        lon: f64,
        lat: f64,
    ) -> Self {
        Self {
            id: id.into(),
            obstacle_type: obstacle_type.into(),
            region: UNKNOWN_REGION.to_string(),
            min_altitude: None,
            max_altitude: None,
            radius: None,
            description: None,
            valid_from: None,
            valid_to: None,
            location: Coordinate { lon, lat },
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = normalize_region(Some(region));
        self
    }

    /// Set the vertical extent in flight levels.
    pub fn with_altitudes(mut self, min_fl: Option<i32>, max_fl: Option<i32>) -> Self {
        self.min_altitude = min_fl;
        self.max_altitude = max_fl;
        self
    }

    pub fn with_radius(mut self, radius_nm: f64) -> Self {
        self.radius = Some(radius_nm);
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_validity(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.valid_from = from;
        self.valid_to = to;
        self
    }

    /// Upper limit in FL, 0 when absent.
    pub fn max_fl(&self) -> i32 {
        self.max_altitude.unwrap_or(0)
    }

    /// Lower limit in FL, 0 when absent.
    pub fn min_fl(&self) -> i32 {
        self.min_altitude.unwrap_or(0)
    }

    /// Upper limit in feet.
    pub fn max_height_ft(&self) -> i64 {
        i64::from(self.max_fl()) * crate::rules::FEET_PER_FL
    }

    /// Radius in NM, 0 when absent.
    pub fn radius_nm(&self) -> f64 {
        self.radius.unwrap_or(0.0)
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn is_permanent(&self) -> bool {
        self.valid_to.is_none()
    }
}

/// Upper-case a FIR code, falling back to `UNK` for missing or blank values.
pub fn normalize_region(region: Option<&str>) -> String {
    match region.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_uppercase(),
        _ => UNKNOWN_REGION.to_string(),
    }
}

fn unknown_region() -> String {
    UNKNOWN_REGION.to_string()
}

fn deserialize_region<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_region(raw.as_deref()))
}

static NEXT_COLLECTION_VERSION: AtomicU64 = AtomicU64::new(1);

/// Immutable, ordered set of obstacles loaded for a session.
///
/// Every instance gets a fresh `version`, which is what memoized views key
/// on. Replacing the data means building a new collection.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollection {
    version: u64,
    features: Vec<Arc<ObstacleFeature>>,
}

impl FeatureCollection {
    pub fn new(features: Vec<ObstacleFeature>) -> Self {
        Self {
            version: NEXT_COLLECTION_VERSION.fetch_add(1, Ordering::Relaxed),
            features: features.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn features(&self) -> &[Arc<ObstacleFeature>] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Every distinct type tag present, in tag order.
    pub fn types(&self) -> BTreeSet<ObstacleType> {
        self.features
            .iter()
            .map(|f| f.obstacle_type.clone())
            .collect()
    }
}

/// User-controlled filter knobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParameters {
    pub min_height_ft: i64,
    pub max_height_ft: i64,
    pub active_types: BTreeSet<ObstacleType>,
    pub search_term: String,
    pub unlit_only: bool,
    /// FIR code or `ALL`
    pub region_filter: String,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            min_height_ft: 0,
            max_height_ft: DEFAULT_MAX_HEIGHT_FT,
            active_types: ObstacleType::KNOWN.iter().cloned().collect(),
            search_term: String::new(),
            unlit_only: false,
            region_filter: REGION_ALL.to_string(),
        }
    }
}

impl FilterParameters {
    /// Activate every type present in `collection` on top of the current set.
    pub fn with_all_types_of(mut self, collection: &FeatureCollection) -> Self {
        self.active_types.extend(collection.types());
        self
    }
}

/// Region/value pair as reported by the stats resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCount {
    pub name: String,
    pub value: u64,
}

/// Precomputed aggregate over the whole (unfiltered) dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_fir: Vec<RegionCount>,
    #[serde(default)]
    pub vertical: BTreeMap<String, u64>,
}
