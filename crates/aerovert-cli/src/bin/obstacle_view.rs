//! Filter an obstacle dataset and print its analytics.

use std::path::PathBuf;

use aerovert_cli::{load_dataset, render_summary, DatasetLocation};
use aerovert_core::{compute_view, AnalyticsOptions, FilterParameters, ObstacleType};
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Filter obstacles and print hazard analytics
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// GeoJSON FeatureCollection file
    #[arg(long, conflicts_with = "url")]
    features: Option<PathBuf>,

    /// Obstacle API base URL
    #[arg(long)]
    url: Option<String>,

    /// Stats summary JSON file
    #[arg(long)]
    stats: Option<PathBuf>,

    #[arg(long, default_value_t = 0)]
    min_height_ft: i64,

    #[arg(long, default_value_t = 50_000)]
    max_height_ft: i64,

    /// Comma separated type tags; defaults to the four known types
    #[arg(long, value_delimiter = ',')]
    types: Vec<String>,

    /// Activate every type present in the dataset
    #[arg(long, conflicts_with = "types")]
    all_types: bool,

    /// Case-insensitive match on description, id or region
    #[arg(long, default_value = "")]
    search: String,

    #[arg(long)]
    unlit_only: bool,

    /// FIR code, or ALL
    #[arg(long, default_value = "ALL")]
    region: String,

    #[arg(long, default_value_t = 7)]
    freshness_days: u32,

    /// Year of the monthly activity histogram
    #[arg(long)]
    year: Option<i32>,

    /// Maximum number of critical hazards
    #[arg(long, default_value_t = 15)]
    limit: usize,

    /// Number of regions in the risk ranking
    #[arg(long, default_value_t = 3)]
    top_regions: usize,

    /// Reference day (YYYY-MM-DD) for freshness; today when omitted
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Print a text summary instead of JSON
    #[arg(long)]
    summary: bool,
}

impl Args {
    fn location(&self) -> Result<DatasetLocation> {
        match (&self.features, &self.url) {
            (Some(path), _) => Ok(DatasetLocation::File(path.clone())),
            (None, Some(url)) => Ok(DatasetLocation::Url(url.clone())),
            (None, None) => bail!("either --features or --url is required"),
        }
    }

    fn params(&self) -> FilterParameters {
        let mut params = FilterParameters {
            min_height_ft: self.min_height_ft,
            max_height_ft: self.max_height_ft,
            search_term: self.search.clone(),
            unlit_only: self.unlit_only,
            region_filter: self.region.clone(),
            ..FilterParameters::default()
        };
        if !self.types.is_empty() {
            params.active_types = self
                .types
                .iter()
                .map(|tag| ObstacleType::parse(&tag.to_uppercase()))
                .collect();
        }
        params
    }

    fn options(&self) -> AnalyticsOptions {
        AnalyticsOptions {
            freshness_window_days: self.freshness_days,
            critical_limit: self.limit,
            regional_top_n: self.top_regions,
            activity_year: self.year,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (collection, stats) = load_dataset(&args.location()?, args.stats.as_deref())?;

    let mut params = args.params();
    if args.all_types {
        params = params.with_all_types_of(&collection);
    }
    let today = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let view = compute_view(Some(&collection), Some(&stats), &params, &args.options(), today);

    if args.summary {
        print!("{}", render_summary(&view));
    } else {
        let json = serde_json::to_string_pretty(&view).context("serializing view")?;
        println!("{}", json);
    }
    Ok(())
}
