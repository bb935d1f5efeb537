//! Fetching the obstacle dataset from the upstream API or local files.

use std::path::PathBuf;
use std::time::Duration;

use aerovert_core::{parse_feature_collection, parse_stats_summary, FeatureCollection, StatsSummary};
use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::Config;

const OBSTACLES_PATH: &str = "/api/v1/obstacles";
const STATS_PATH: &str = "/api/v1/stats";

/// A freshly fetched dataset.
#[derive(Debug)]
pub struct Dataset {
    pub collection: FeatureCollection,
    pub stats: StatsSummary,
}

/// Where the dataset comes from.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Http { client: Client, base_url: String },
    File { features: PathBuf, stats: Option<PathBuf> },
}

impl DatasetSource {
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(features) = &config.data_file {
            return Ok(Self::File {
                features: features.clone(),
                stats: config.stats_file.clone(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("building upstream HTTP client")?;
        Ok(Self::Http {
            client,
            base_url: config.upstream_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http { base_url, .. } => base_url.clone(),
            Self::File { features, .. } => features.display().to_string(),
        }
    }

    /// Fetch the feature collection and its stats summary.
    ///
    /// A missing or broken stats resource is not fatal: the summary is then
    /// recomputed from the fetched features.
    pub async fn fetch(&self) -> Result<Dataset> {
        let (collection, stats) = match self {
            Self::Http { client, base_url } => {
                let body = get_text(client, &format!("{}{}", base_url, OBSTACLES_PATH)).await?;
                let collection = parse_feature_collection(&body)?;
                let stats = match get_text(client, &format!("{}{}", base_url, STATS_PATH)).await {
                    Ok(body) => parse_stats_summary(&body).map_err(anyhow::Error::from),
                    Err(err) => Err(err),
                };
                (collection, stats)
            }
            Self::File { features, stats } => {
                let body = tokio::fs::read_to_string(features)
                    .await
                    .with_context(|| format!("reading {}", features.display()))?;
                let collection = parse_feature_collection(&body)?;
                let stats = match stats {
                    Some(path) => read_stats_file(path).await,
                    None => Err(anyhow::anyhow!("no stats file configured")),
                };
                (collection, stats)
            }
        };

        let stats = stats.unwrap_or_else(|err| {
            tracing::warn!("Stats summary unavailable ({}), deriving it locally", err);
            StatsSummary::from_features(collection.features())
        });

        Ok(Dataset { collection, stats })
    }
}

async fn get_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?;
    Ok(response.text().await?)
}

async fn read_stats_file(path: &PathBuf) -> Result<StatsSummary> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_stats_summary(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("aerovert-{}-{}", uuid::Uuid::new_v4(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    const FEATURES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [8.0, 53.0]},
         "properties": {"id": "F1/25", "type": "CRANE", "fir": "EDWW", "max_fl": 4}}
    ]}"#;

    #[tokio::test]
    async fn file_source_derives_missing_stats() {
        let features = write_temp("features.json", FEATURES);
        let source = DatasetSource::File {
            features,
            stats: None,
        };
        let dataset = source.fetch().await.unwrap();
        assert_eq!(dataset.collection.len(), 1);
        assert_eq!(dataset.stats.total, 1);
        assert_eq!(dataset.stats.by_fir[0].name, "EDWW");
    }

    #[tokio::test]
    async fn file_source_reads_stats_file() {
        let features = write_temp("features.json", FEATURES);
        let stats = write_temp(
            "stats.json",
            r#"{"total": 99, "by_type": {}, "by_fir": [{"name": "EDGG", "value": 99}], "vertical": {}}"#,
        );
        let source = DatasetSource::File {
            features,
            stats: Some(stats),
        };
        let dataset = source.fetch().await.unwrap();
        assert_eq!(dataset.stats.total, 99);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = DatasetSource::File {
            features: PathBuf::from("/definitely/not/here.geojson"),
            stats: None,
        };
        assert!(source.fetch().await.is_err());
    }
}
