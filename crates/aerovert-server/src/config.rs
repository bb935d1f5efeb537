//! Server configuration from environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use aerovert_core::AnalyticsOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Base URL of the obstacle API serving `/api/v1/obstacles` and `/api/v1/stats`
    pub upstream_url: String,
    /// Local GeoJSON file used instead of the upstream API when set
    pub data_file: Option<PathBuf>,
    pub stats_file: Option<PathBuf>,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub max_sessions: usize,
    pub analytics: AnalyticsOptions,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = AnalyticsOptions::default();
        Self {
            server_port: parse_env("AEROVERT_PORT", 3000),
            upstream_url: env::var("AEROVERT_UPSTREAM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            data_file: env::var("AEROVERT_DATA_FILE").ok().map(PathBuf::from),
            stats_file: env::var("AEROVERT_STATS_FILE").ok().map(PathBuf::from),
            refresh_interval_secs: parse_env("AEROVERT_REFRESH_SECS", 300),
            request_timeout_secs: parse_env("AEROVERT_REQUEST_TIMEOUT_SECS", 30),
            max_sessions: parse_env("AEROVERT_MAX_SESSIONS", 256),
            analytics: AnalyticsOptions {
                freshness_window_days: parse_env(
                    "AEROVERT_FRESHNESS_DAYS",
                    defaults.freshness_window_days,
                ),
                critical_limit: parse_env("AEROVERT_CRITICAL_LIMIT", defaults.critical_limit),
                regional_top_n: parse_env("AEROVERT_REGIONAL_TOP_N", defaults.regional_top_n),
                activity_year: env::var("AEROVERT_ACTIVITY_YEAR")
                    .ok()
                    .and_then(|s| s.parse().ok()),
            },
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
