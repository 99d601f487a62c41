//! Hand-off of finished tables to a charting backend.
//!
//! Nothing here draws. A [`ChartSpec`] carries the table plus the explicit
//! [`RenderConfig`] it should be drawn with, and a [`Renderer`] decides what
//! to do with it.

use log::info;
use serde::{Deserialize, Serialize};

use crate::processor::Result;

pub mod charts;
pub mod json;

pub use charts::{BoxStats, GroupedBar, HistogramBin};
pub use json::JsonRenderer;

const SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

const SPECTRAL: [&str; 6] = [
    "#d53e4f", "#fc8d59", "#fee08b", "#e6f598", "#99d594", "#3288bd",
];

/// Drawing parameters passed explicitly with every chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Colours as `#rrggbb`, cycled over series
    pub palette: Vec<String>,
    /// Figure width in inches
    pub width: f64,
    /// Figure height in inches
    pub height: f64,
    /// Rotation of the x tick labels in degrees
    pub x_label_rotation: i32,
}

impl RenderConfig {
    /// 8-colour Set2 palette, 8x6 inches, vertical x labels
    pub fn set2() -> Self {
        RenderConfig {
            palette: SET2.iter().map(|c| c.to_string()).collect(),
            width: 8.0,
            height: 6.0,
            x_label_rotation: 90,
        }
    }

    /// 6-colour Spectral palette, horizontal x labels
    pub fn spectral() -> Self {
        RenderConfig {
            palette: SPECTRAL.iter().map(|c| c.to_string()).collect(),
            x_label_rotation: 0,
            ..Self::set2()
        }
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.x_label_rotation = degrees;
        self
    }

    pub fn color(&self, idx: usize) -> Option<&str> {
        if self.palette.is_empty() {
            None
        } else {
            Some(&self.palette[idx % self.palette.len()])
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::set2()
    }
}

/// The table a chart is drawn from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    Histogram(Vec<HistogramBin>),
    BoxPlot(Vec<BoxStats>),
    Bar(Vec<(String, f64)>),
    GroupedBar {
        x_column: String,
        hue_column: String,
        bars: Vec<GroupedBar>,
    },
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Histogram(bins) => bins.is_empty(),
            ChartData::BoxPlot(boxes) => boxes.is_empty(),
            ChartData::Bar(bars) => bars.is_empty(),
            ChartData::GroupedBar { bars, .. } => bars.is_empty(),
        }
    }
}

/// A finished table plus everything needed to draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub config: RenderConfig,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn new(title: &str, data: ChartData, config: &RenderConfig) -> Self {
        ChartSpec {
            title: title.to_string(),
            x_label: String::new(),
            y_label: String::new(),
            config: config.clone(),
            data,
        }
    }

    pub fn labels(mut self, x: &str, y: &str) -> Self {
        self.x_label = x.to_string();
        self.y_label = y.to_string();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A charting backend
///
/// Implementations must treat an empty chart as "no data", not as an error.
pub trait Renderer {
    fn render(&mut self, name: &str, chart: &ChartSpec) -> Result<()>;
}

/// Keeps rendered charts in memory
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    pub charts: Vec<(String, ChartSpec)>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }
}

impl Renderer for MemoryRenderer {
    fn render(&mut self, name: &str, chart: &ChartSpec) -> Result<()> {
        if chart.is_empty() {
            info!("{name}: no data");
            return Ok(());
        }
        self.charts.push((name.to_string(), chart.clone()));
        Ok(())
    }
}
