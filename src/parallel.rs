//! Parallel-coordinates plot with percentile threshold scoring
//!
//! # Layout
//!
//! Each configured platform metric is a vertical axis. All axes share ONE
//! logarithmic scale whose domain spans the smallest and largest positive
//! value across every dimension, so a million Spotify streams sits at the
//! same height as a million TikTok views.
//!
//! # Threshold scoring
//!
//! With a percentile `p` in `(0, 1)`, every dimension gets its own cutoff:
//!
//! ```text
//! positive values, ascending:  v[0] <= v[1] <= ... <= v[n-1]
//! cutoff index:                floor(n * (1 - p))
//! threshold:                   v[index]
//! ```
//!
//! A song "passes" a dimension when its raw value is >= that threshold. The
//! number of passed dimensions drives the line encoding:
//!
//! | passed        | stroke                  | opacity                 |
//! |---------------|-------------------------|-------------------------|
//! | `p == 0`      | steel blue              | 0.5                     |
//! | 0             | light grey              | 0.1 (not interactive)   |
//! | k of n        | grey -> blue at `k / n` | `0.3 + k / n * 0.7`     |
//!
//! A dimension without any positive value has no threshold and nobody passes
//! it.

use crate::config::{ParallelConfig, PlatformSpec};
use crate::dataset::Record;
use crate::error::{Error, Result};
use crate::format::format_number;
use serde::Serialize;
use std::collections::BTreeMap;

/// Dimension id -> cutoff value. Empty when no thresholding is requested.
pub type ThresholdMap = BTreeMap<String, f64>;

const COLOR_NONE: (u8, u8, u8) = (0xdd, 0xdd, 0xdd);
const COLOR_ALL: (u8, u8, u8) = (0x46, 0x82, 0xb4);
pub const HOVER_STROKE: &str = "#ff4444";
const BASE_STROKE_WIDTH: f64 = 1.5;
const TICK_COUNT: usize = 5;

/// Reject percentiles outside `[0, 1)`
pub fn validate_percentile(percentile: f64) -> Result<f64> {
    if percentile.is_finite() && (0.0..1.0).contains(&percentile) {
        Ok(percentile)
    } else {
        Err(Error::InvalidPercentile(percentile))
    }
}

// ============================================================================
// Scales
// ============================================================================

/// Clamped logarithmic scale, range `[height, 0]` (large values at the top)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LogScale {
    /// Scale spanning the positive values; `[1, 1]` when there are none
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I, height: f64) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| *v > 0.0)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let domain = if min.is_finite() { [min, max] } else { [1.0, 1.0] };
        Self {
            domain,
            range: [height, 0.0],
        }
    }

    fn log_span(&self) -> (f64, f64) {
        let lo = self.domain[0].ln();
        (lo, self.domain[1].ln() - lo)
    }

    /// Pixel position for a value; non-positive values clamp to the bottom
    pub fn scale(&self, value: f64) -> f64 {
        let (lo, span) = self.log_span();
        let t = if span == 0.0 {
            0.5
        } else if value <= 0.0 {
            0.0
        } else {
            ((value.ln() - lo) / span).clamp(0.0, 1.0)
        };
        self.range[0] + t * (self.range[1] - self.range[0])
    }

    /// Value for a pixel position, clamped to the domain
    pub fn invert(&self, px: f64) -> f64 {
        let (lo, span) = self.log_span();
        let extent = self.range[1] - self.range[0];
        let t = if extent == 0.0 {
            0.0
        } else {
            ((px - self.range[0]) / extent).clamp(0.0, 1.0)
        };
        // exact at the ends so a full-height brush keeps the extremes
        if t <= 0.0 {
            self.domain[0]
        } else if t >= 1.0 {
            self.domain[1]
        } else {
            (lo + t * span).exp()
        }
    }

    /// Powers of ten inside the domain, thinned to at most `count`
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let first = self.domain[0].log10().ceil() as i32;
        let last = self.domain[1].log10().floor() as i32;
        if last < first || count == 0 {
            return vec![];
        }

        let n = (last - first + 1) as usize;
        let step = n.div_ceil(count);
        (first..=last)
            .step_by(step)
            .map(|e| 10f64.powi(e))
            .collect()
    }
}

/// Evenly spaced categorical positions over `[0, width]`
pub fn point_positions(count: usize, width: f64) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![width / 2.0],
        n => (0..n).map(|i| i as f64 * width / (n - 1) as f64).collect(),
    }
}

// ============================================================================
// Threshold scoring
// ============================================================================

/// Per-dimension cutoffs for the top `percentile` of positive values
pub fn compute_thresholds(
    records: &[&Record],
    dimensions: &[PlatformSpec],
    percentile: f64,
) -> Result<ThresholdMap> {
    let percentile = validate_percentile(percentile)?;
    let mut thresholds = ThresholdMap::new();
    if percentile == 0.0 {
        return Ok(thresholds);
    }

    for (i, dim) in dimensions.iter().enumerate() {
        let mut values: Vec<f64> = records
            .iter()
            .map(|r| r.metric(i))
            .filter(|v| *v > 0.0)
            .collect();

        if values.is_empty() {
            tracing::debug!(dimension = %dim.id, "no positive values, skipping threshold");
            continue;
        }

        values.sort_by(|a, b| a.total_cmp(b));
        let index = ((values.len() as f64 * (1.0 - percentile)).floor() as usize).min(values.len() - 1);
        thresholds.insert(dim.id.clone(), values[index]);
    }

    Ok(thresholds)
}

/// Threshold state for one render: decides which dimensions a song passes
#[derive(Debug, Clone)]
pub struct Scoring<'a> {
    pub percentile: f64,
    pub thresholds: ThresholdMap,
    dimensions: &'a [PlatformSpec],
}

impl<'a> Scoring<'a> {
    pub fn new(records: &[&Record], dimensions: &'a [PlatformSpec], percentile: f64) -> Result<Self> {
        let thresholds = compute_thresholds(records, dimensions, percentile)?;
        Ok(Self {
            percentile,
            thresholds,
            dimensions,
        })
    }

    pub fn is_active(&self) -> bool {
        self.percentile > 0.0
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// Whether the record's value on dimension `index` reaches its threshold
    pub fn passes(&self, record: &Record, index: usize) -> bool {
        if !self.is_active() {
            return true;
        }
        self.dimensions
            .get(index)
            .and_then(|d| self.thresholds.get(&d.id))
            .is_some_and(|t| record.metric(index) >= *t)
    }

    pub fn passed_count(&self, record: &Record) -> usize {
        (0..self.dimensions.len())
            .filter(|i| self.passes(record, *i))
            .count()
    }

    pub fn style(&self, passed: usize) -> LineStyle {
        LineStyle::for_passed(passed, self.dimensions.len(), self.is_active())
    }

    /// Multi-line hover text for one song
    pub fn tooltip(&self, record: &Record) -> String {
        let mut text = format!("{} by {}\n", record.track_name, record.artist_name);
        text.push_str(&format!(
            "Passes {} out of {} thresholds\n\n",
            self.passed_count(record),
            self.dimensions.len()
        ));
        for (i, dim) in self.dimensions.iter().enumerate() {
            let mark = if self.passes(record, i) { " ✓" } else { "" };
            text.push_str(&format!("{}: {}{}\n", dim.label, format_number(record.metric(i)), mark));
        }
        text
    }
}

// ============================================================================
// Visual encoding
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Lines that pass nothing ignore pointer events
    pub interactive: bool,
}

impl LineStyle {
    pub fn for_passed(passed: usize, dimension_count: usize, thresholding: bool) -> Self {
        let ratio = if dimension_count == 0 {
            0.0
        } else {
            passed as f64 / dimension_count as f64
        };

        let opacity = if !thresholding {
            0.5
        } else if passed > 0 {
            0.3 + ratio * 0.7
        } else {
            0.1
        };

        Self {
            stroke: interpolate_color(ratio),
            stroke_width: BASE_STROKE_WIDTH,
            opacity,
            interactive: passed > 0,
        }
    }
}

/// Linear RGB blend from light grey (0.0) to steel blue (1.0)
pub fn interpolate_color(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(COLOR_NONE.0, COLOR_ALL.0),
        mix(COLOR_NONE.1, COLOR_ALL.1),
        mix(COLOR_NONE.2, COLOR_ALL.2)
    )
}

fn fmt_coord(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    // avoid "-0"
    format!("{}", rounded + 0.0)
}

/// SVG path through each axis: `M x,y L x,y ...`
pub fn line_path(values: &[f64], xs: &[f64], scale: &LogScale) -> String {
    values
        .iter()
        .zip(xs)
        .enumerate()
        .map(|(i, (v, x))| {
            let cmd = if i == 0 { 'M' } else { 'L' };
            format!("{}{},{}", cmd, fmt_coord(*x), fmt_coord(scale.scale(v.max(1.0))))
        })
        .collect()
}

// ============================================================================
// Chart
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub id: String,
    pub label: String,
    pub x: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    pub value: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdMarker {
    pub dimension: String,
    pub value: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub count: usize,
    pub label: String,
    pub stroke: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub track_name: String,
    pub artist_name: String,
    pub genre: String,
    pub values: Vec<f64>,
    pub passed_count: usize,
    pub path: String,
    pub style: LineStyle,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParallelChart {
    pub width: f64,
    pub height: f64,
    pub percentile: f64,
    pub axes: Vec<Axis>,
    pub scale: LogScale,
    pub ticks: Vec<Tick>,
    pub thresholds: ThresholdMap,
    pub markers: Vec<ThresholdMarker>,
    pub legend: Vec<LegendEntry>,
    pub hover_stroke: &'static str,
    pub lines: Vec<Line>,
}

/// Shape records (already genre-filtered) into a parallel-coordinates chart
pub fn build(records: &[&Record], config: &ParallelConfig, percentile: f64) -> Result<ParallelChart> {
    let dims = &config.dimensions;
    let scoring = Scoring::new(records, dims, percentile)?;

    let scale = LogScale::from_values(
        records.iter().flat_map(|r| r.metrics.iter().copied()),
        config.height,
    );

    let xs = point_positions(dims.len(), config.width);
    let axes = dims
        .iter()
        .zip(&xs)
        .map(|(d, x)| Axis {
            id: d.id.clone(),
            label: d.label.clone(),
            x: *x,
        })
        .collect();

    let ticks = scale
        .ticks(TICK_COUNT)
        .into_iter()
        .map(|value| Tick {
            value,
            y: scale.scale(value),
            label: format_number(value),
        })
        .collect();

    let marker_label = format!("Top {}%", (percentile * 100.0).round() as i64);
    let markers = dims
        .iter()
        .filter_map(|d| {
            scoring.thresholds.get(&d.id).map(|t| ThresholdMarker {
                dimension: d.id.clone(),
                value: *t,
                y: scale.scale(*t),
                label: marker_label.clone(),
            })
        })
        .collect();

    let legend = if scoring.is_active() {
        legend_entries(dims.len())
    } else {
        vec![]
    };

    let lines = records
        .iter()
        .map(|r| {
            let passed_count = scoring.passed_count(r);
            Line {
                track_name: r.track_name.clone(),
                artist_name: r.artist_name.clone(),
                genre: r.genre.clone(),
                values: r.metrics.clone(),
                passed_count,
                path: line_path(&r.metrics, &xs, &scale),
                style: scoring.style(passed_count),
                tooltip: scoring.tooltip(r),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        lines = lines.len(),
        percentile,
        thresholds = scoring.thresholds.len(),
        "built parallel chart"
    );

    Ok(ParallelChart {
        width: config.width,
        height: config.height,
        percentile,
        axes,
        scale,
        ticks,
        thresholds: scoring.thresholds,
        markers,
        legend,
        hover_stroke: HOVER_STROKE,
        lines,
    })
}

fn legend_entries(dimension_count: usize) -> Vec<LegendEntry> {
    [
        (dimension_count, "All thresholds"),
        (dimension_count.div_ceil(2), "Some thresholds"),
        (1, "One threshold"),
        (0, "No thresholds"),
    ]
    .into_iter()
    .map(|(count, label)| {
        let style = LineStyle::for_passed(count, dimension_count, true);
        LegendEntry {
            count,
            label: label.to_string(),
            stroke: style.stroke,
            opacity: style.opacity,
        }
    })
    .collect()
}

impl ParallelChart {
    pub fn axis_index(&self, dimension: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.id == dimension)
    }

    /// Visibility mask for a brush spanning pixels `y0..y1` on one axis.
    ///
    /// Both ends are inverted through the shared scale and ordered, so a
    /// brush dragged upwards selects the same songs as one dragged down.
    pub fn brush(&self, dimension: &str, y0: f64, y1: f64) -> Result<Vec<bool>> {
        let index = self
            .axis_index(dimension)
            .ok_or_else(|| Error::UnknownDimension(dimension.to_string()))?;

        let a = self.scale.invert(y0);
        let b = self.scale.invert(y1);
        let (min, max) = if a <= b { (a, b) } else { (b, a) };

        Ok(self
            .lines
            .iter()
            .map(|l| {
                let v = l.values.get(index).copied().unwrap_or(0.0);
                v >= min && v <= max
            })
            .collect())
    }
}
