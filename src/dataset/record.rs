//! Typed song records for the parallel-coordinates plot

use crate::config::ParallelConfig;
use crate::dataset::loader::RawRow;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One song with a metric per configured platform dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub track_name: String,
    pub artist_name: String,
    pub genre: String,
    /// Aligned with the configured dimensions; every value is >= 0
    pub metrics: Vec<f64>,
}

impl Record {
    pub fn from_row(row: &RawRow, config: &ParallelConfig) -> Self {
        let field = |column: &str| row.get(column).cloned().unwrap_or_default();
        Self {
            track_name: field(&config.track_column),
            artist_name: field(&config.artist_column),
            genre: field(&config.genre_column),
            metrics: config
                .dimensions
                .iter()
                .map(|d| coerce_metric(row.get(&d.column).map(String::as_str)))
                .collect(),
        }
    }

    /// Value for the dimension at `index`, 0 when out of range
    pub fn metric(&self, index: usize) -> f64 {
        self.metrics.get(index).copied().unwrap_or(0.0)
    }

    pub fn has_any_metric(&self) -> bool {
        self.metrics.iter().any(|v| *v > 0.0)
    }
}

/// Coerce a raw cell into a metric. Missing, empty, non-numeric, non-finite
/// and negative values all become 0.
pub fn coerce_metric(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(0.0)
}

/// Convert raw rows into records, dropping songs with no reach anywhere
pub fn records_from_rows(rows: &[RawRow], config: &ParallelConfig) -> Vec<Record> {
    rows.par_iter()
        .map(|row| Record::from_row(row, config))
        .filter(Record::has_any_metric)
        .collect()
}

/// Title-case each space-separated word ("hip hop" -> "Hip Hop")
pub fn normalize_genre(genre: &str) -> String {
    genre
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Genre selector options: "all" followed by the sorted distinct genres
pub fn genre_options(records: &[Record]) -> Vec<String> {
    let genres: BTreeSet<String> = records.iter().map(|r| normalize_genre(&r.genre)).collect();
    std::iter::once("all".to_string()).chain(genres).collect()
}

/// Genre selection; `Contains` holds a lower-cased needle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GenreFilter {
    #[default]
    All,
    Contains(String),
}

impl GenreFilter {
    pub fn matches(&self, genre: &str) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Contains(needle) => genre.to_lowercase().contains(needle.as_str()),
        }
    }

    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(&r.genre)).collect()
    }
}

impl From<String> for GenreFilter {
    fn from(value: String) -> Self {
        let value = value.trim().to_lowercase();
        if value.is_empty() || value == "all" {
            GenreFilter::All
        } else {
            GenreFilter::Contains(value)
        }
    }
}

impl From<&str> for GenreFilter {
    fn from(value: &str) -> Self {
        GenreFilter::from(value.to_string())
    }
}

impl From<GenreFilter> for String {
    fn from(filter: GenreFilter) -> Self {
        match filter {
            GenreFilter::All => "all".to_string(),
            GenreFilter::Contains(needle) => needle,
        }
    }
}

impl std::fmt::Display for GenreFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenreFilter::All => write!(f, "all"),
            GenreFilter::Contains(needle) => write!(f, "{}", needle),
        }
    }
}
