//! Platform -> genre hit flows for the Sankey diagram
//!
//! Every configured platform becomes a `platform` node and every distinct
//! genre in the data becomes a `genre` node. A link carries the number of
//! songs of that genre flagged as a hit on that platform:
//!
//! ```text
//! Spotify ──(42)──▶ pop
//! Spotify ──(17)──▶ rock
//! TikTok  ──(31)──▶ pop
//! ```
//!
//! The hit flag is stored in the CSV as the string `"True"`; anything else,
//! including `"true"` or `"1"`, is not a hit. Links of weight zero are never
//! emitted. Node positions and link widths are left to the D3 layout.

use crate::dataset::RawRow;
use crate::error::{Error, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Literal stored in `<Platform>_Hit` columns for a hit
pub const HIT_LITERAL: &str = "True";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Platform,
    Genre,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    /// Always >= 1
    pub value: u64,
}

impl Link {
    /// Hover title, e.g. "Apple Music → pop: 12 songs"
    pub fn title(&self) -> String {
        format!("{} → {}: {} songs", display_name(&self.source), self.target, self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SankeyData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl SankeyData {
    /// Total flow through a node: outgoing for platforms, incoming for genres
    pub fn node_value(&self, id: &str) -> u64 {
        let outgoing: u64 = self.links.iter().filter(|l| l.source == id).map(|l| l.value).sum();
        let incoming: u64 = self.links.iter().filter(|l| l.target == id).map(|l| l.value).sum();
        outgoing.max(incoming)
    }

    pub fn total_hits(&self) -> u64 {
        self.links.iter().map(|l| l.value).sum()
    }
}

/// Platform selection for the Sankey diagram
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(String),
}

impl PlatformFilter {
    /// Parse a selector value; `"all"` (or empty) means no filter.
    /// Any other value must name a configured platform.
    pub fn parse(value: &str, platforms: &[String]) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Ok(PlatformFilter::All);
        }
        if platforms.iter().any(|p| p == value) {
            Ok(PlatformFilter::Only(value.to_string()))
        } else {
            Err(Error::UnknownPlatform(value.to_string()))
        }
    }

    pub fn includes(&self, platform: &str) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(p) => p == platform,
        }
    }
}

impl std::fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformFilter::All => write!(f, "all"),
            PlatformFilter::Only(p) => write!(f, "{}", p),
        }
    }
}

/// "Apple_Music" -> "Apple Music"
pub fn display_name(platform: &str) -> String {
    platform.replace('_', " ")
}

pub fn hit_column(platform: &str) -> String {
    format!("{}_Hit", platform)
}

/// Distinct genre values in first-seen order. An empty cell is a genre of
/// its own; only rows lacking the column are skipped.
pub fn distinct_genres(rows: &[RawRow], genre_column: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut genres = Vec::new();
    for genre in rows.iter().filter_map(|row| row.get(genre_column)) {
        if seen.insert(genre.as_str()) {
            genres.push(genre.clone());
        }
    }
    genres
}

/// Build Sankey nodes and links from raw rows.
///
/// A genre equal to a platform id is dropped with a warning, together with
/// its hit links, so node ids stay unique and no self-link is emitted. Those
/// hits are not counted anywhere.
pub fn build(
    rows: &[RawRow],
    platforms: &[String],
    genre_column: &str,
    filter: &PlatformFilter,
) -> SankeyData {
    let mut nodes: Vec<Node> = platforms
        .iter()
        .map(|p| Node {
            id: p.clone(),
            name: display_name(p),
            node_type: NodeType::Platform,
        })
        .collect();

    let mut genres = distinct_genres(rows, genre_column);
    genres.retain(|genre| {
        let collides = platforms.contains(genre);
        if collides {
            tracing::warn!(genre = %genre, "genre collides with a platform id, skipping it");
        }
        !collides
    });

    for genre in &genres {
        nodes.push(Node {
            id: genre.clone(),
            name: genre.clone(),
            node_type: NodeType::Genre,
        });
    }

    let links: Vec<Link> = platforms
        .par_iter()
        .filter(|p| filter.includes(p))
        .flat_map_iter(|platform| platform_links(rows, platform, genre_column, &genres))
        .collect();

    tracing::debug!(
        filter = %filter,
        nodes = nodes.len(),
        links = links.len(),
        "built sankey"
    );

    SankeyData { nodes, links }
}

fn platform_links(rows: &[RawRow], platform: &str, genre_column: &str, genres: &[String]) -> Vec<Link> {
    let column = hit_column(platform);

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        let is_hit = row.get(&column).map(String::as_str) == Some(HIT_LITERAL);
        if !is_hit {
            continue;
        }
        if let Some(genre) = row.get(genre_column) {
            *counts.entry(genre.as_str()).or_insert(0) += 1;
        }
    }

    genres
        .iter()
        .filter_map(|genre| {
            let count = counts.get(genre.as_str()).copied().unwrap_or(0);
            (count > 0).then(|| Link {
                source: platform.to_string(),
                target: genre.clone(),
                value: count,
            })
        })
        .collect()
}
