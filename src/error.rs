//! Error types for streamcharts

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV header or record could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Percentile must be finite and within [0, 1)
    #[error("Invalid percentile {0}: expected a value in [0, 1)")]
    InvalidPercentile(f64),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),
}

pub type Result<T> = std::result::Result<T, Error>;
