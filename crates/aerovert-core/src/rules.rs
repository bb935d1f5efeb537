//! Hazard thresholds and the canonical vertical banding.

use serde::{Deserialize, Serialize};

/// 1 FL = 100 ft
pub const FEET_PER_FL: i64 = 100;

/// Features with a larger radius are area notices, not point obstacles.
pub const MAX_HYGIENIC_RADIUS_NM: f64 = 1.5;

/// Lower-case description fragments that mark a lighting failure.
pub const UNLIT_MARKERS: [&str; 3] = ["unlit", "lgt out", "out of service"];

/// VFR cruise band in FL, inclusive (500 to 2000 ft).
pub const VFR_BAND_MIN_FL: i32 = 5;
pub const VFR_BAND_MAX_FL: i32 = 20;

/// Obstacles above this FL are critical regardless of lighting.
pub const CRITICAL_ALTITUDE_FL: i32 = 20;

pub const DEFAULT_MAX_HEIGHT_FT: i64 = 50_000;
pub const REGION_ALL: &str = "ALL";
pub const UNKNOWN_REGION: &str = "UNK";

/// Five ordered altitude bands over `maxAltitude`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalBand {
    /// FL < 5
    Surface,
    /// FL 5..=10
    LowVfr,
    /// FL 11..=20
    UpperVfr,
    /// FL 21..=50
    Elevated,
    /// FL > 50
    High,
}

impl VerticalBand {
    pub const ALL: [VerticalBand; 5] = [
        VerticalBand::Surface,
        VerticalBand::LowVfr,
        VerticalBand::UpperVfr,
        VerticalBand::Elevated,
        VerticalBand::High,
    ];

    pub fn from_fl(max_fl: i32) -> Self {
        match max_fl {
            i32::MIN..=4 => Self::Surface,
            5..=10 => Self::LowVfr,
            11..=20 => Self::UpperVfr,
            21..=50 => Self::Elevated,
            _ => Self::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Surface => "<500 ft",
            Self::LowVfr => "500-1000 ft",
            Self::UpperVfr => "1000-2000 ft",
            Self::Elevated => "2000-5000 ft",
            Self::High => ">5000 ft",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}
