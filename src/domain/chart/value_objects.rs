use derive_more::Display;
use serde::Serialize;
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - the three lines drawn for every symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    #[display(fmt = "Close Price ($)")]
    #[strum(serialize = "close_price")]
    ClosePrice,
    #[display(fmt = "SMA 20 (Simple Moving Average)")]
    #[strum(serialize = "sma_20")]
    #[serde(rename = "sma_20")]
    Sma20,
    #[display(fmt = "SMA 50 (Simple Moving Average)")]
    #[strum(serialize = "sma_50")]
    #[serde(rename = "sma_50")]
    Sma50,
}

impl SeriesKind {
    /// Opaque line color
    pub fn border_color(&self) -> Rgba {
        match self {
            SeriesKind::ClosePrice => Rgba::new(75, 192, 192, 1.0),
            SeriesKind::Sma20 => Rgba::new(153, 102, 255, 1.0),
            SeriesKind::Sma50 => Rgba::new(255, 159, 64, 1.0),
        }
    }

    /// Translucent fill used for point markers and legend boxes
    pub fn background_color(&self) -> Rgba {
        self.border_color().with_alpha(0.2)
    }

    /// Text for the static legend block under the chart.
    pub fn description(&self) -> &'static str {
        match self {
            SeriesKind::ClosePrice => "The ETF's closing price (in USD).",
            SeriesKind::Sma20 => "Simple moving average over the last 20 days.",
            SeriesKind::Sma50 => "Simple moving average over the last 50 days.",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            SeriesKind::ClosePrice => "Close Price",
            SeriesKind::Sma20 => "SMA 20",
            SeriesKind::Sma50 => "SMA 50",
        }
    }
}

/// Value Object - CSS color
#[derive(Debug, Clone, Copy, PartialEq, Display)]
#[display(fmt = "rgba({}, {}, {}, {})", r, g, b, a)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Value Object - which axes an interaction affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[display(fmt = "x")]
    #[strum(serialize = "x")]
    X,
    #[display(fmt = "y")]
    #[strum(serialize = "y")]
    Y,
    #[display(fmt = "xy")]
    #[strum(serialize = "xy")]
    XY,
}

impl InteractionMode {
    pub fn affects_x(&self) -> bool {
        matches!(self, InteractionMode::X | InteractionMode::XY)
    }

    pub fn affects_y(&self) -> bool {
        matches!(self, InteractionMode::Y | InteractionMode::XY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    #[display(fmt = "top")]
    Top,
    #[display(fmt = "bottom")]
    Bottom,
}

/// Value Object - visible window in data space
///
/// `x` is measured in label indices (0 is the first entry), `y` in price units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartView {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for ChartView {
    fn default() -> Self {
        Self { x_min: 0.0, x_max: 1.0, y_min: 0.0, y_max: 1.0 }
    }
}

impl ChartView {
    /// Smallest horizontal window: two labels.
    pub const MIN_X_SPAN: f64 = 1.0;
    pub const MIN_Y_SPAN: f64 = 1e-6;

    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Scale around an anchor given in data coordinates; `factor > 1` zooms in.
    pub fn zoom(&mut self, factor: f64, anchor_x: f64, anchor_y: f64, mode: InteractionMode) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        if mode.affects_x() {
            let span = (self.x_span() / factor).max(Self::MIN_X_SPAN);
            let ratio = Self::anchor_ratio(anchor_x, self.x_min, self.x_span());
            self.x_min = anchor_x - span * ratio;
            self.x_max = self.x_min + span;
        }
        if mode.affects_y() {
            let span = (self.y_span() / factor).max(Self::MIN_Y_SPAN);
            let ratio = Self::anchor_ratio(anchor_y, self.y_min, self.y_span());
            self.y_min = anchor_y - span * ratio;
            self.y_max = self.y_min + span;
        }
    }

    /// Shift the window by data-space deltas.
    pub fn pan(&mut self, dx: f64, dy: f64, mode: InteractionMode) {
        if mode.affects_x() && dx.is_finite() {
            self.x_min += dx;
            self.x_max += dx;
        }
        if mode.affects_y() && dy.is_finite() {
            self.y_min += dy;
            self.y_max += dy;
        }
    }

    /// Indices of entries inside the window, clamped to `0..len`.
    pub fn visible_indices(&self, len: usize) -> std::ops::Range<usize> {
        if len == 0 {
            return 0..0;
        }
        let start = self.x_min.ceil().max(0.0) as usize;
        let end = (self.x_max.floor().max(-1.0) + 1.0) as usize;
        start.min(len)..end.min(len).max(start.min(len))
    }

    fn anchor_ratio(anchor: f64, min: f64, span: f64) -> f64 {
        if span <= 0.0 { 0.5 } else { ((anchor - min) / span).clamp(0.0, 1.0) }
    }
}

/// Value Object - canvas size and the plot area inside it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self::new(960.0, 500.0)
    }
}

impl ChartLayout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding_left: 80.0,
            padding_right: 24.0,
            padding_top: 44.0,
            padding_bottom: 72.0,
        }
    }

    pub fn plot_left(&self) -> f64 {
        self.padding_left
    }

    pub fn plot_right(&self) -> f64 {
        (self.width - self.padding_right).max(self.padding_left + 1.0)
    }

    pub fn plot_top(&self) -> f64 {
        self.padding_top
    }

    pub fn plot_bottom(&self) -> f64 {
        (self.height - self.padding_bottom).max(self.padding_top + 1.0)
    }

    pub fn plot_width(&self) -> f64 {
        self.plot_right() - self.plot_left()
    }

    pub fn plot_height(&self) -> f64 {
        self.plot_bottom() - self.plot_top()
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.plot_left() && px <= self.plot_right() && py >= self.plot_top() && py <= self.plot_bottom()
    }

    pub fn x_to_px(&self, view: &ChartView, x: f64) -> f64 {
        self.plot_left() + (x - view.x_min) / view.x_span() * self.plot_width()
    }

    pub fn y_to_px(&self, view: &ChartView, y: f64) -> f64 {
        // Invert Y
        self.plot_bottom() - (y - view.y_min) / view.y_span() * self.plot_height()
    }

    pub fn px_to_x(&self, view: &ChartView, px: f64) -> f64 {
        view.x_min + (px - self.plot_left()) / self.plot_width() * view.x_span()
    }

    pub fn px_to_y(&self, view: &ChartView, py: f64) -> f64 {
        view.y_min + (self.plot_bottom() - py) / self.plot_height() * view.y_span()
    }

    /// Convert a pointer drag in pixels to a data-space pan delta.
    ///
    /// Dragging right reveals earlier labels, dragging down reveals lower prices.
    pub fn drag_to_pan(&self, view: &ChartView, dx_px: f64, dy_px: f64) -> (f64, f64) {
        (
            -dx_px / self.plot_width() * view.x_span(),
            dy_px / self.plot_height() * view.y_span(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_display_matches_css() {
        assert_eq!(SeriesKind::ClosePrice.border_color().to_string(), "rgba(75, 192, 192, 1)");
        assert_eq!(SeriesKind::Sma50.background_color().to_string(), "rgba(255, 159, 64, 0.2)");
    }

    #[test]
    fn interaction_mode_parses() {
        assert_eq!("xy".parse::<InteractionMode>().unwrap(), InteractionMode::XY);
        assert!(InteractionMode::X.affects_x());
        assert!(!InteractionMode::X.affects_y());
    }

    #[test]
    fn visible_indices_clamp() {
        let view = ChartView::new(-2.5, 3.2, 0.0, 1.0);
        assert_eq!(view.visible_indices(10), 0..4);
        assert_eq!(view.visible_indices(2), 0..2);
        assert_eq!(view.visible_indices(0), 0..0);
        let view = ChartView::new(20.0, 30.0, 0.0, 1.0);
        assert_eq!(view.visible_indices(10), 10..10);
    }

    #[test]
    fn projection_roundtrip_edges() {
        let layout = ChartLayout::new(400.0, 300.0);
        let view = ChartView::new(0.0, 10.0, 100.0, 200.0);
        assert_eq!(layout.x_to_px(&view, 0.0), layout.plot_left());
        assert_eq!(layout.x_to_px(&view, 10.0), layout.plot_right());
        assert_eq!(layout.y_to_px(&view, 100.0), layout.plot_bottom());
        assert_eq!(layout.y_to_px(&view, 200.0), layout.plot_top());
        assert!((layout.px_to_x(&view, layout.x_to_px(&view, 4.0)) - 4.0).abs() < 1e-9);
    }
}
