//! Loading a dataset from disk or from the obstacle API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aerovert_core::{parse_feature_collection, parse_stats_summary, FeatureCollection, StatsSummary};
use anyhow::{Context, Result};
use reqwest::blocking::Client;

/// Where the CLI reads its features from.
#[derive(Debug, Clone)]
pub enum DatasetLocation {
    File(PathBuf),
    /// Base URL of an API serving `/api/v1/obstacles` and `/api/v1/stats`
    Url(String),
}

/// Load features and stats.
///
/// An explicit stats file wins. Otherwise a URL source also fetches the
/// remote stats, and anything missing or unreadable is derived from the
/// features themselves.
pub fn load_dataset(
    location: &DatasetLocation,
    stats_file: Option<&Path>,
) -> Result<(FeatureCollection, StatsSummary)> {
    let (collection, remote_stats) = match location {
        DatasetLocation::File(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            (parse_feature_collection(&body)?, None)
        }
        DatasetLocation::Url(base_url) => {
            let client = Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .context("building HTTP client")?;
            let base_url = base_url.trim_end_matches('/');
            let body = get_text(&client, &format!("{}/api/v1/obstacles", base_url))?;
            let collection = parse_feature_collection(&body)?;
            let stats = get_text(&client, &format!("{}/api/v1/stats", base_url))
                .and_then(|body| Ok(parse_stats_summary(&body)?));
            (collection, Some(stats))
        }
    };
    tracing::info!("Loaded {} obstacles", collection.len());

    let stats = match (stats_file, remote_stats) {
        (Some(path), _) => read_stats(path)?,
        (None, Some(Ok(stats))) => stats,
        (None, Some(Err(err))) => {
            tracing::warn!("Stats summary unavailable ({:#}), deriving it locally", err);
            StatsSummary::from_features(collection.features())
        }
        (None, None) => StatsSummary::from_features(collection.features()),
    };

    Ok((collection, stats))
}

fn get_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?;
    Ok(response.text()?)
}

fn read_stats(path: &Path) -> Result<StatsSummary> {
    let body =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_stats_summary(&body).with_context(|| format!("parsing {}", path.display()))
}
