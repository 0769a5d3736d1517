//! Configuration file support for streamcharts
//!
//! Reads from `streamcharts.toml` (or the path given with `--config`).
//! Every section is optional; missing values fall back to the built-in
//! platform lists of the streaming dataset.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "streamcharts.toml";

/// A platform metric plotted as one parallel-coordinates axis
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlatformSpec {
    /// Stable identifier used as the axis key (e.g. `spotify_streams`)
    pub id: String,
    /// Display label (e.g. `Spotify`)
    pub label: String,
    /// Source CSV column holding the metric
    pub column: String,
}

impl PlatformSpec {
    pub fn new(id: &str, label: &str, column: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            column: column.to_string(),
        }
    }
}

/// Configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sankey: SankeyConfig,

    #[serde(default)]
    pub parallel: ParallelConfig,
}

/// Sankey (platform -> genre hit flow) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SankeyConfig {
    /// Column holding the genre used for genre nodes
    /// Default: "genre"
    #[serde(default = "default_sankey_genre_column")]
    pub genre_column: String,

    /// Platform identifiers; each one reads its `<id>_Hit` column
    #[serde(default = "default_sankey_platforms")]
    pub platforms: Vec<String>,
}

/// Parallel-coordinates settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParallelConfig {
    #[serde(default = "default_parallel_genre_column")]
    pub genre_column: String,

    #[serde(default = "default_track_column")]
    pub track_column: String,

    #[serde(default = "default_artist_column")]
    pub artist_column: String,

    /// Plot area width in pixels (margins excluded)
    #[serde(default = "default_width")]
    pub width: f64,

    /// Plot area height in pixels (margins excluded)
    #[serde(default = "default_height")]
    pub height: f64,

    /// Percentiles offered by the performance selector
    #[serde(default = "default_percentile_options")]
    pub percentile_options: Vec<f64>,

    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<PlatformSpec>,
}

fn default_sankey_genre_column() -> String {
    "genre".to_string()
}

fn default_sankey_platforms() -> Vec<String> {
    [
        "Spotify",
        "YouTube",
        "TikTok",
        "Apple_Music",
        "SiriusXM",
        "Deezer",
        "Amazon",
        "Pandora",
        "Shazam",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_parallel_genre_column() -> String {
    "track_genre".to_string()
}

fn default_track_column() -> String {
    "Track Name".to_string()
}

fn default_artist_column() -> String {
    "Artist Name".to_string()
}

fn default_width() -> f64 {
    1000.0
}

fn default_height() -> f64 {
    500.0
}

fn default_percentile_options() -> Vec<f64> {
    vec![0.0, 0.25, 0.5, 0.75]
}

fn default_dimensions() -> Vec<PlatformSpec> {
    vec![
        PlatformSpec::new("spotify_streams", "Spotify", "Spotify Streams"),
        PlatformSpec::new("youtube_views", "YouTube", "YouTube Views"),
        PlatformSpec::new("tiktok_views", "TikTok", "TikTok Views"),
        PlatformSpec::new("deezer_reach", "Deezer", "Deezer Playlist Reach"),
        PlatformSpec::new("apple_playlists", "Apple Music", "Apple Music Playlist Count"),
    ]
}

impl Default for SankeyConfig {
    fn default() -> Self {
        Self {
            genre_column: default_sankey_genre_column(),
            platforms: default_sankey_platforms(),
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            genre_column: default_parallel_genre_column(),
            track_column: default_track_column(),
            artist_column: default_artist_column(),
            width: default_width(),
            height: default_height(),
            percentile_options: default_percentile_options(),
            dimensions: default_dimensions(),
        }
    }
}

impl Config {
    /// Load config from an explicit path, or from the nearest
    /// `streamcharts.toml`. Returns the default config if neither exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::find_config_path(),
        };

        match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                let contents = std::fs::read_to_string(&path)?;
                Self::parse(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Find streamcharts.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    fn validate(&self) -> Result<()> {
        if self.parallel.dimensions.is_empty() {
            return Err(Error::Config("parallel.dimensions must not be empty".into()));
        }
        if !(self.parallel.width > 0.0 && self.parallel.height > 0.0) {
            return Err(Error::Config("parallel width and height must be positive".into()));
        }
        if has_duplicates(self.parallel.dimensions.iter().map(|d| d.id.as_str())) {
            return Err(Error::Config("parallel dimension ids must be unique".into()));
        }
        if has_duplicates(self.sankey.platforms.iter().map(String::as_str)) {
            return Err(Error::Config("sankey platforms must be unique".into()));
        }
        if let Some(p) = self
            .parallel
            .percentile_options
            .iter()
            .find(|p| !(p.is_finite() && (0.0..1.0).contains(*p)))
        {
            return Err(Error::Config(format!(
                "percentile option {} is outside [0, 1)",
                p
            )));
        }
        Ok(())
    }

}

fn has_duplicates<'a>(values: impl Iterator<Item = &'a str>) -> bool {
    let mut seen = std::collections::HashSet::new();
    !values.into_iter().all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sankey.platforms.len(), 9);
        assert!(config.sankey.platforms.iter().any(|p| p == "Apple_Music"));
        assert_eq!(config.sankey.genre_column, "genre");
        assert_eq!(config.parallel.dimensions.len(), 5);
        assert_eq!(config.parallel.dimensions[3].column, "Deezer Playlist Reach");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[sankey]
platforms = ["Spotify", "Shazam"]

[parallel]
height = 300.0
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.sankey.platforms, vec!["Spotify", "Shazam"]);
        assert_eq!(config.sankey.genre_column, "genre");
        assert_eq!(config.parallel.height, 300.0);
        assert_eq!(config.parallel.width, 1000.0);
        assert_eq!(config.parallel.dimensions.len(), 5);
    }

    #[test]
    fn test_parse_custom_dimensions() {
        let toml = r#"
[[parallel.dimensions]]
id = "plays"
label = "Plays"
column = "Total Plays"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.parallel.dimensions, vec![PlatformSpec::new("plays", "Plays", "Total Plays")]);
    }

    #[test]
    fn test_rejects_duplicate_dimension_ids() {
        let toml = r#"
[[parallel.dimensions]]
id = "a"
label = "A"
column = "A"

[[parallel.dimensions]]
id = "a"
label = "B"
column = "B"
"#;
        assert!(matches!(Config::parse(toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_platforms() {
        let toml = "[sankey]\nplatforms = [\"Spotify\", \"TikTok\", \"Spotify\"]\n";
        assert!(matches!(Config::parse(toml), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_percentile_options_out_of_range() {
        for options in ["[0.0, 1.0]", "[-0.25]", "[0.5, 2.0]"] {
            let toml = format!("[parallel]\npercentile_options = {}\n", options);
            assert!(matches!(Config::parse(&toml), Err(Error::Config(_))), "{}", options);
        }
        let ok = Config::parse("[parallel]\npercentile_options = [0.0, 0.9]\n").unwrap();
        assert_eq!(ok.parallel.percentile_options, vec![0.0, 0.9]);
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(Config::parse("[sankey\nplatforms = "), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[sankey]\ngenre_column = \"style\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.sankey.genre_column, "style");
    }

    #[test]
    fn test_load_missing_explicit_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
