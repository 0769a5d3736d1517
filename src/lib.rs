//! streamcharts - Hit flows and reach across music streaming platforms
//!
//! streamcharts loads a song-per-row CSV and shapes it into the data behind
//! two interactive D3 charts:
//!
//! 1. **Sankey diagram**: which genres become hits on which platform. Every
//!    platform and every genre is a node; a link counts the songs of a genre
//!    whose `<Platform>_Hit` column reads `"True"`.
//!
//! 2. **Parallel coordinates**: one axis per platform metric on a shared
//!    logarithmic scale. An optional percentile marks the top fraction of
//!    each axis, and every line is shaded by how many of those thresholds the
//!    song clears.
//!
//! # Quick Start
//!
//! ```no_run
//! use streamcharts::{chart, ChartParams, Config, Dataset};
//!
//! let config = Config::default();
//! let dataset = Dataset::load("final_df_cleaned.csv", &config);
//!
//! let params = ChartParams { percentile: 0.25, ..ChartParams::default() };
//! let data = chart::render(&dataset, &params, &config).unwrap();
//!
//! for link in &data.sankey.links {
//!     println!("{}", link.title());
//! }
//! println!("{} songs plotted", data.parallel.lines.len());
//! ```
//!
//! # Modules
//!
//! - [`dataset`]: CSV loading and typed records
//! - [`sankey`]: platform -> genre nodes and links
//! - [`parallel`]: scales, threshold scoring, line encoding, brushing
//! - [`chart`]: parameters and the render entry point
//! - [`report`]: HTML and JSON output
//! - [`serve`]: interactive HTTP mode

pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod parallel;
pub mod report;
pub mod sankey;
pub mod serve;

pub use chart::{ChartData, ChartParams, RawParams};
pub use config::{Config, PlatformSpec};
pub use dataset::{Dataset, GenreFilter, Record};
pub use error::{Error, Result};
pub use format::format_number;
pub use parallel::{ParallelChart, ThresholdMap};
pub use sankey::{PlatformFilter, SankeyData};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is re-exported from the root.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        let _: PlatformFilter = PlatformFilter::All;
        let _: GenreFilter = GenreFilter::All;
        let _ = ChartParams::default();
        let _ = Config::default();
    }

    #[test]
    fn test_render_empty_dataset() {
        // An unreadable CSV yields an empty dataset; rendering must still work
        let config = Config::default();
        let data = chart::render(&Dataset::default(), &ChartParams::default(), &config).unwrap();
        assert!(data.sankey.links.is_empty());
        assert!(data.parallel.lines.is_empty());
        assert_eq!(data.genres, vec!["all"]);
    }
}
