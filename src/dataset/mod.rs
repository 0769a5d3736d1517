//! Dataset loading and record shaping
//!
//! The Sankey diagram reads raw rows directly (it needs the `<Platform>_Hit`
//! columns as strings), while the parallel-coordinates plot works on typed
//! [`Record`]s. A [`Dataset`] holds both views of the same CSV file and is
//! never mutated after loading.

pub mod loader;
pub mod record;

pub use loader::{load_rows, parse_rows, try_load_rows, RawRow};
pub use record::{
    coerce_metric, genre_options, normalize_genre, records_from_rows, GenreFilter, Record,
};

use crate::config::Config;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<RawRow>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<RawRow>, config: &Config) -> Self {
        let records = records_from_rows(&rows, &config.parallel);
        tracing::info!(
            rows = rows.len(),
            records = records.len(),
            "dataset ready"
        );
        Self { rows, records }
    }

    /// Load a CSV file. An unreadable file yields an empty dataset.
    pub fn load<P: AsRef<Path>>(path: P, config: &Config) -> Self {
        Self::from_rows(load_rows(path), config)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
