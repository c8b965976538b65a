use std::cell::Cell;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{ChartTheme, chart_theme};
use crate::domain::{
    chart::{
        ChartConfig, ChartLayout, ChartView, LegendPosition, LineDataset, TooltipData,
        format_price_tick, label_stride, line_segments, price_ticks,
    },
    errors::{AppError, RenderingResult},
    logging::LogComponent,
};
use crate::log_trace;

const LEGEND_BOX: f64 = 12.0;
const LEGEND_GAP: f64 = 24.0;

/// Canvas 2D line chart - Infrastructure implementation
pub struct LineChartRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    theme: &'static ChartTheme,
    pixel_ratio: Cell<f64>,
}

impl LineChartRenderer {
    /// Fails when the chart components were not registered yet.
    pub fn new(canvas: HtmlCanvasElement) -> RenderingResult<Self> {
        let theme = chart_theme()?;
        let context = canvas
            .get_context("2d")
            .map_err(|e| AppError::rendering_from_js("Failed to get 2D context", e))?
            .ok_or_else(|| AppError::Rendering("2D context not available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AppError::Rendering("Failed to cast to 2D context".to_string()))?;

        Ok(Self { canvas, context, theme, pixel_ratio: Cell::new(1.0) })
    }

    /// Layout in CSS pixels; the backing store is `pixel_ratio` times larger.
    pub fn layout(&self) -> ChartLayout {
        let ratio = self.pixel_ratio.get();
        ChartLayout::new(self.canvas.width() as f64 / ratio, self.canvas.height() as f64 / ratio)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio.get()
    }

    /// Size the backing store to `css_width x css_height` at `pixel_ratio`.
    ///
    /// Returns `false` when nothing changed, so callers can skip a redraw.
    pub fn resize_to(&self, css_width: f64, css_height: f64, pixel_ratio: f64) -> bool {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let width = (css_width * ratio).round().max(1.0) as u32;
        let height = (css_height * ratio).round().max(1.0) as u32;
        if width == self.canvas.width() && height == self.canvas.height() && ratio == self.pixel_ratio.get() {
            return false;
        }

        self.pixel_ratio.set(ratio);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        log_trace!(
            LogComponent::Infrastructure("LineChartRenderer"),
            "Backing store {}x{} at ratio {}",
            width,
            height,
            ratio
        );
        true
    }

    /// Match the element's on-screen size and the window's device pixel ratio.
    pub fn fit_to_display(&self) -> bool {
        let (width, height) = (self.canvas.client_width(), self.canvas.client_height());
        if width <= 0 || height <= 0 {
            return false;
        }
        self.resize_to(width as f64, height as f64, gloo::utils::window().device_pixel_ratio())
    }

    pub fn render(
        &self,
        config: &ChartConfig,
        view: &ChartView,
        tooltip: Option<&TooltipData>,
    ) -> RenderingResult<()> {
        let layout = self.layout();
        let ratio = self.pixel_ratio.get();
        self.ctx()
            .set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
            .map_err(|e| AppError::rendering_from_js("scale", e))?;
        self.clear(&layout);
        self.render_title(&layout, &config.title)?;

        if config.is_empty() {
            self.render_no_data_message(&layout)?;
        } else {
            self.render_y_axis(&layout, view)?;
            self.render_x_labels(&layout, view, &config.labels)?;
            self.render_datasets(&layout, view, &config.datasets)?;
            if let Some(tip) = tooltip {
                self.render_tooltip(&layout, view, tip)?;
            }
        }
        self.render_legend(&layout, config)?;

        log_trace!(
            LogComponent::Infrastructure("LineChartRenderer"),
            "Rendered {} labels in x {:.1}..{:.1}",
            config.len(),
            view.x_min,
            view.x_max
        );
        Ok(())
    }

    fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.context
    }

    fn clear(&self, layout: &ChartLayout) {
        let ctx = self.ctx();
        ctx.clear_rect(0.0, 0.0, layout.width, layout.height);
        ctx.set_fill_style_str(self.theme.background);
        ctx.fill_rect(0.0, 0.0, layout.width, layout.height);
    }

    fn render_title(&self, layout: &ChartLayout, title: &str) -> RenderingResult<()> {
        let ctx = self.ctx();
        ctx.set_fill_style_str(self.theme.text_color);
        ctx.set_font(self.theme.title_font);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(title, layout.width / 2.0, layout.padding_top / 2.0)
            .map_err(|e| AppError::rendering_from_js("title", e))
    }

    fn render_no_data_message(&self, layout: &ChartLayout) -> RenderingResult<()> {
        let ctx = self.ctx();
        ctx.set_fill_style_str(self.theme.muted_text_color);
        ctx.set_font(self.theme.tick_font);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(
            "No data for this symbol",
            layout.plot_left() + layout.plot_width() / 2.0,
            layout.plot_top() + layout.plot_height() / 2.0,
        )
        .map_err(|e| AppError::rendering_from_js("empty message", e))
    }

    fn render_y_axis(&self, layout: &ChartLayout, view: &ChartView) -> RenderingResult<()> {
        let ctx = self.ctx();
        ctx.set_font(self.theme.tick_font);
        ctx.set_text_align("right");
        ctx.set_text_baseline("middle");
        ctx.set_line_width(1.0);

        for tick in price_ticks(view.y_min, view.y_max, 8) {
            if tick < view.y_min || tick > view.y_max {
                continue;
            }
            let y = layout.y_to_px(view, tick).round() + 0.5;
            ctx.set_stroke_style_str(self.theme.grid_color);
            ctx.begin_path();
            ctx.move_to(layout.plot_left(), y);
            ctx.line_to(layout.plot_right(), y);
            ctx.stroke();

            ctx.set_fill_style_str(self.theme.muted_text_color);
            ctx.fill_text(&format_price_tick(tick), layout.plot_left() - 8.0, y)
                .map_err(|e| AppError::rendering_from_js("y tick", e))?;
        }

        ctx.set_stroke_style_str(self.theme.axis_color);
        ctx.stroke_rect(layout.plot_left(), layout.plot_top(), layout.plot_width(), layout.plot_height());
        Ok(())
    }

    fn render_x_labels(&self, layout: &ChartLayout, view: &ChartView, labels: &[String]) -> RenderingResult<()> {
        let visible = view.visible_indices(labels.len());
        let stride = label_stride(visible.len(), layout.plot_width(), self.theme.min_label_spacing);

        let ctx = self.ctx();
        ctx.set_font(self.theme.tick_font);
        ctx.set_fill_style_str(self.theme.muted_text_color);
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");

        for index in visible.filter(|i| i % stride == 0) {
            let x = layout.x_to_px(view, index as f64);
            ctx.fill_text(&labels[index], x, layout.plot_bottom() + 8.0)
                .map_err(|e| AppError::rendering_from_js("x label", e))?;
        }
        Ok(())
    }

    fn render_datasets(&self, layout: &ChartLayout, view: &ChartView, datasets: &[LineDataset]) -> RenderingResult<()> {
        let ctx = self.ctx();
        ctx.save();
        ctx.begin_path();
        ctx.rect(layout.plot_left(), layout.plot_top(), layout.plot_width(), layout.plot_height());
        ctx.clip();

        let result = datasets.iter().try_for_each(|dataset| self.render_dataset(layout, view, dataset));
        ctx.restore();
        result
    }

    fn render_dataset(&self, layout: &ChartLayout, view: &ChartView, dataset: &LineDataset) -> RenderingResult<()> {
        let ctx = self.ctx();
        let stroke = dataset.border_color.to_string();
        let fill = dataset.background_color.to_string();
        let segments = line_segments(&dataset.data, view, layout);

        ctx.set_stroke_style_str(&stroke);
        ctx.set_line_width(self.theme.line_width);
        ctx.set_line_join("round");
        for segment in &segments {
            let mut points = segment.iter();
            if let Some(&(x, y)) = points.next() {
                ctx.begin_path();
                ctx.move_to(x, y);
                points.for_each(|&(x, y)| ctx.line_to(x, y));
                ctx.stroke();
            }
        }

        let visible = view.visible_indices(dataset.data.len()).len();
        if visible > self.theme.max_marked_points {
            return Ok(());
        }
        ctx.set_fill_style_str(&fill);
        ctx.set_line_width(1.0);
        for &(x, y) in segments.iter().flatten() {
            ctx.begin_path();
            ctx.arc(x, y, self.theme.point_radius, 0.0, std::f64::consts::TAU)
                .map_err(|e| AppError::rendering_from_js("point", e))?;
            ctx.fill();
            ctx.stroke();
        }
        Ok(())
    }

    fn render_legend(&self, layout: &ChartLayout, config: &ChartConfig) -> RenderingResult<()> {
        let ctx = self.ctx();
        ctx.set_font(self.theme.legend_font);
        ctx.set_text_baseline("middle");
        ctx.set_text_align("left");

        let widths = config
            .datasets
            .iter()
            .map(|d| {
                ctx.measure_text(&d.label)
                    .map(|m| m.width() + LEGEND_BOX + 6.0)
                    .map_err(|e| AppError::rendering_from_js("legend", e))
            })
            .collect::<RenderingResult<Vec<f64>>>()?;
        let total = widths.iter().sum::<f64>() + LEGEND_GAP * widths.len().saturating_sub(1) as f64;

        let y = match config.legend_position {
            LegendPosition::Bottom => layout.height - 16.0,
            LegendPosition::Top => layout.padding_top - 6.0,
        };
        let mut x = (layout.width - total) / 2.0;
        for (dataset, width) in config.datasets.iter().zip(widths) {
            ctx.set_fill_style_str(&dataset.background_color.to_string());
            ctx.fill_rect(x, y - LEGEND_BOX / 2.0, LEGEND_BOX, LEGEND_BOX);
            ctx.set_stroke_style_str(&dataset.border_color.to_string());
            ctx.set_line_width(1.0);
            ctx.stroke_rect(x, y - LEGEND_BOX / 2.0, LEGEND_BOX, LEGEND_BOX);

            ctx.set_fill_style_str(self.theme.text_color);
            ctx.fill_text(&dataset.label, x + LEGEND_BOX + 6.0, y)
                .map_err(|e| AppError::rendering_from_js("legend", e))?;
            x += width + LEGEND_GAP;
        }
        Ok(())
    }

    fn render_tooltip(&self, layout: &ChartLayout, view: &ChartView, tip: &TooltipData) -> RenderingResult<()> {
        let ctx = self.ctx();
        let x = layout.x_to_px(view, tip.index as f64);

        ctx.set_stroke_style_str(self.theme.axis_color);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(x, layout.plot_top());
        ctx.line_to(x, layout.plot_bottom());
        ctx.stroke();

        ctx.set_font(self.theme.tooltip_font);
        let lines: Vec<&str> = std::iter::once(tip.title.as_str())
            .chain(tip.lines.iter().map(|(_, line)| line.as_str()))
            .collect();
        let mut width: f64 = 0.0;
        for line in &lines {
            let metrics = ctx.measure_text(line).map_err(|e| AppError::rendering_from_js("tooltip", e))?;
            width = width.max(metrics.width());
        }
        let line_height = 16.0;
        let box_w = width + 16.0;
        let box_h = lines.len() as f64 * line_height + 10.0;

        // flip to the left near the right edge
        let left = if x + 12.0 + box_w > layout.plot_right() { x - 12.0 - box_w } else { x + 12.0 };
        let top = tip.y.clamp(layout.plot_top(), (layout.plot_bottom() - box_h).max(layout.plot_top()));

        ctx.set_fill_style_str(self.theme.tooltip_background);
        ctx.fill_rect(left, top, box_w, box_h);

        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        ctx.set_fill_style_str("#ffffff");
        for (i, line) in lines.iter().enumerate() {
            ctx.fill_text(line, left + 8.0, top + 5.0 + i as f64 * line_height)
                .map_err(|e| AppError::rendering_from_js("tooltip", e))?;
        }
        Ok(())
    }
}
