use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Chart kinds
// =============================================================================

/// The closed set of chart shapes the mapper knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Column,
    Bar,
    Line,
    Combo,
    Pie,
    Heatmap,
    Table,
    Funnel,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 9] = [
        ChartKind::Column,
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Combo,
        ChartKind::Pie,
        ChartKind::Heatmap,
        ChartKind::Table,
        ChartKind::Funnel,
        ChartKind::Scatter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Column => "column",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Combo => "combo",
            ChartKind::Pie => "pie",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Table => "table",
            ChartKind::Funnel => "funnel",
            ChartKind::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| format!("unknown chart kind '{s}'"))
    }
}

// =============================================================================
// Mapped datasets
// =============================================================================

/// Chart-kind-specific data handed to the rendering layer.
///
/// Recomputed on every input change; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum MappedDataset {
    /// Column, bar, line, combo and pie charts.
    Category(CategoryDataset),
    Funnel(FunnelDataset),
    Heatmap(HeatmapDataset),
    Scatter(ScatterDataset),
    /// The canonical table is rendered as-is; no mapping happens.
    Table,
}

impl MappedDataset {
    /// The empty dataset for `kind`, used for tables without rows.
    pub fn empty(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Table => MappedDataset::Table,
            ChartKind::Funnel => MappedDataset::Funnel(FunnelDataset::default()),
            ChartKind::Heatmap => MappedDataset::Heatmap(HeatmapDataset::default()),
            ChartKind::Scatter => MappedDataset::Scatter(ScatterDataset::default()),
            ChartKind::Bar => MappedDataset::Category(CategoryDataset {
                orientation: Orientation::Horizontal,
                ..Default::default()
            }),
            _ => MappedDataset::Category(CategoryDataset::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
    Pie,
}

/// One named run of values rendered together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub kind: SeriesKind,
    /// `None` marks a non-numeric cell; renderers draw a gap.
    pub values: Vec<Option<f64>>,
    /// One color per value, or a single series-wide color for line series.
    pub colors: Vec<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CategoryDataset {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FunnelDataset {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    /// Bar thickness per stage, in pixels, parallel to `labels`.
    pub bar_thickness: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub x_index: usize,
    pub y_index: usize,
    pub value: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapDataset {
    pub x_categories: Vec<String>,
    pub y_categories: Vec<String>,
    pub cells: Vec<HeatmapCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScatterDataset {
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_kind_round_trips_through_name() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.name().parse::<ChartKind>().unwrap(), kind);
        }
        assert_eq!(" Pie ".parse::<ChartKind>().unwrap(), ChartKind::Pie);
        assert!("donut".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_empty_bar_is_horizontal() {
        match MappedDataset::empty(ChartKind::Bar) {
            MappedDataset::Category(ds) => {
                assert_eq!(ds.orientation, Orientation::Horizontal);
                assert!(ds.labels.is_empty());
                assert!(ds.series.is_empty());
            }
            other => panic!("unexpected dataset {other:?}"),
        }
    }
}
