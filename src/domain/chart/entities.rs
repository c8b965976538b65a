use serde::Serialize;

use super::value_objects::{InteractionMode, LegendPosition, Rgba, SeriesKind};

/// One line of the chart: a value (or gap) per shared label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDataset {
    pub kind: SeriesKind,
    pub label: String,
    pub border_color: Rgba,
    pub background_color: Rgba,
    pub data: Vec<Option<f64>>,
}

impl LineDataset {
    pub fn new(kind: SeriesKind, data: Vec<Option<f64>>) -> Self {
        Self {
            kind,
            label: kind.to_string(),
            border_color: kind.border_color(),
            background_color: kind.background_color(),
            data,
        }
    }

    pub fn gap_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_none()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanOptions {
    pub enabled: bool,
    pub mode: InteractionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomOptions {
    pub wheel: bool,
    pub pinch: bool,
    pub mode: InteractionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InteractionOptions {
    pub pan: PanOptions,
    pub zoom: ZoomOptions,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            pan: PanOptions { enabled: true, mode: InteractionMode::XY },
            zoom: ZoomOptions { wheel: true, pinch: true, mode: InteractionMode::XY },
        }
    }
}

/// Everything the renderer needs to draw one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<LineDataset>,
    pub legend_position: LegendPosition,
    pub interaction: InteractionOptions,
}

impl ChartConfig {
    pub fn dataset(&self, kind: SeriesKind) -> Option<&LineDataset> {
        self.datasets.iter().find(|d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Finite values of every dataset, gaps skipped.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.datasets.iter().flat_map(|d| d.data.iter().flatten().copied())
    }
}

/// Hover details for one label index.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipData {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub title: String,
    pub lines: Vec<(SeriesKind, String)>,
}

impl TooltipData {
    pub fn formatted_text(&self) -> String {
        let mut text = self.title.clone();
        for (_, line) in &self.lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }
}
