//! CSV loading
//!
//! Produces one [`RawRow`] per data row, keyed by header name. Loading never
//! aborts the caller: [`load_rows`] logs and returns an empty vector when the
//! source is unreachable or malformed.

use crate::error::Result;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, warn};

/// One CSV row: column name -> raw string value
pub type RawRow = HashMap<String, String>;

/// Load rows from a CSV file, substituting an empty set on failure
pub fn load_rows<P: AsRef<Path>>(path: P) -> Vec<RawRow> {
    let path = path.as_ref();
    match try_load_rows(path) {
        Ok(rows) => rows,
        Err(e) => {
            error!(path = %path.display(), "Error loading data: {}", e);
            Vec::new()
        }
    }
}

pub fn try_load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let rows = parse_rows(file)?;
    debug!(path = %path.display(), rows = rows.len(), "loaded csv");
    Ok(rows)
}

/// Parse CSV from any reader. The header row is required; a row the parser
/// rejects is skipped with a warning.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(row = line + 1, "skipping malformed row: {}", e);
                continue;
            }
        };

        // Short rows simply lack the trailing columns
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
