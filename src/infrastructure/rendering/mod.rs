pub mod canvas_renderer;

pub use canvas_renderer::LineChartRenderer;

use once_cell::sync::OnceCell;

use crate::domain::{
    errors::{AppError, RenderingResult},
    logging::{LogComponent, get_logger},
};

/// Fonts and colours shared by every chart on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTheme {
    pub background: &'static str,
    pub grid_color: &'static str,
    pub axis_color: &'static str,
    pub text_color: &'static str,
    pub muted_text_color: &'static str,
    pub title_font: &'static str,
    pub tick_font: &'static str,
    pub legend_font: &'static str,
    pub tooltip_font: &'static str,
    pub tooltip_background: &'static str,
    pub line_width: f64,
    pub point_radius: f64,
    /// Hide point markers when more labels than this are visible
    pub max_marked_points: usize,
    pub min_label_spacing: f64,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background: "#ffffff",
            grid_color: "rgba(0, 0, 0, 0.08)",
            axis_color: "rgba(0, 0, 0, 0.25)",
            text_color: "#333333",
            muted_text_color: "#666666",
            title_font: "bold 16px Helvetica, Arial, sans-serif",
            tick_font: "12px Helvetica, Arial, sans-serif",
            legend_font: "12px Helvetica, Arial, sans-serif",
            tooltip_font: "12px Helvetica, Arial, sans-serif",
            tooltip_background: "rgba(0, 0, 0, 0.8)",
            line_width: 2.0,
            point_radius: 3.0,
            max_marked_points: 120,
            min_label_spacing: 64.0,
        }
    }
}

static CHART_THEME: OnceCell<ChartTheme> = OnceCell::new();

/// Register the line chart components once per page. Returns `false` when
/// already registered.
pub fn register_chart_components() -> bool {
    register_chart_components_with(ChartTheme::default())
}

pub fn register_chart_components_with(theme: ChartTheme) -> bool {
    let registered = CHART_THEME.set(theme).is_ok();
    if registered {
        get_logger().debug(LogComponent::Infrastructure("Chart"), "Line chart components registered");
    }
    registered
}

pub fn chart_theme() -> RenderingResult<&'static ChartTheme> {
    CHART_THEME.get().ok_or_else(|| {
        AppError::Rendering("chart components used before register_chart_components".to_string())
    })
}
