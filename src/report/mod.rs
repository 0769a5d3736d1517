//! Report generation for rendered charts
//!
//! - **HTML**: Interactive page with D3.js (Sankey layout, parallel
//!   coordinates, brushing, tooltips)
//! - **JSON**: The full [`ChartData`] for programmatic consumption
//!
//! # Usage
//!
//! ```ignore
//! use streamcharts::report;
//!
//! // Automatically picks format based on extension
//! report::generate("charts.html", &data)?;  // HTML
//! report::generate("charts.json", &data)?;  // JSON
//! ```

pub mod html;
pub mod json;

use crate::chart::ChartData;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, data: &ChartData) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, data),
        _ => html::write(&mut file, data),
    }
}

/// Headline numbers for a rendered chart set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub songs: usize,
    pub genres: usize,
    pub links: usize,
    pub hits: u64,
    /// Songs passing every threshold; equals `songs` without thresholding
    pub top_performers: usize,
    pub thresholds: Vec<(String, f64)>,
}

impl Summary {
    pub fn from_chart(data: &ChartData) -> Self {
        let dimension_count = data.parallel.axes.len();
        Self {
            songs: data.parallel.lines.len(),
            genres: data.genres.len().saturating_sub(1),
            links: data.sankey.links.len(),
            hits: data.sankey.total_hits(),
            top_performers: data
                .parallel
                .lines
                .iter()
                .filter(|l| l.passed_count == dimension_count)
                .count(),
            thresholds: data
                .parallel
                .axes
                .iter()
                .filter_map(|a| data.parallel.thresholds.get(&a.id).map(|t| (a.label.clone(), *t)))
                .collect(),
        }
    }
}
