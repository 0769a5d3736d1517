//! Chart parameters and the single render entry point
//!
//! Every selector change produces a new [`ChartParams`]; [`render`] rebuilds
//! both charts from the immutable dataset. Nothing is cached between calls.

use crate::config::Config;
use crate::dataset::{genre_options, Dataset, GenreFilter};
use crate::error::Result;
use crate::parallel::{self, validate_percentile, ParallelChart};
use crate::sankey::{self, PlatformFilter, SankeyData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartParams {
    #[serde(serialize_with = "serialize_display")]
    pub platform: PlatformFilter,
    pub genre: GenreFilter,
    pub percentile: f64,
}

fn serialize_display<S: serde::Serializer>(
    value: &PlatformFilter,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Selector values as they arrive from the CLI or a query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParams {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub percentile: Option<f64>,
}

impl ChartParams {
    /// Validate selector values against the configuration
    pub fn parse(raw: &RawParams, config: &Config) -> Result<Self> {
        let platform = PlatformFilter::parse(
            raw.platform.as_deref().unwrap_or("all"),
            &config.sankey.platforms,
        )?;
        let genre = GenreFilter::from(raw.genre.as_deref().unwrap_or("all"));
        let percentile = validate_percentile(raw.percentile.unwrap_or(0.0))?;

        Ok(Self {
            platform,
            genre,
            percentile,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub params: ChartParams,
    pub sankey: SankeyData,
    pub parallel: ParallelChart,
    pub genres: Vec<String>,
    pub percentile_options: Vec<f64>,
    pub platforms: Vec<String>,
}

pub fn render_sankey(dataset: &Dataset, platform: &PlatformFilter, config: &Config) -> SankeyData {
    sankey::build(
        &dataset.rows,
        &config.sankey.platforms,
        &config.sankey.genre_column,
        platform,
    )
}

pub fn render_parallel(
    dataset: &Dataset,
    genre: &GenreFilter,
    percentile: f64,
    config: &Config,
) -> Result<ParallelChart> {
    let filtered = genre.apply(&dataset.records);
    parallel::build(&filtered, &config.parallel, percentile)
}

/// Rebuild both charts for one set of parameters
pub fn render(dataset: &Dataset, params: &ChartParams, config: &Config) -> Result<ChartData> {
    let sankey = render_sankey(dataset, &params.platform, config);
    let parallel = render_parallel(dataset, &params.genre, params.percentile, config)?;

    Ok(ChartData {
        params: params.clone(),
        sankey,
        parallel,
        genres: genre_options(&dataset.records),
        percentile_options: config.parallel.percentile_options.clone(),
        platforms: config.sankey.platforms.clone(),
    })
}
