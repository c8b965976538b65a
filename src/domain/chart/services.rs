use super::entities::{ChartConfig, InteractionOptions, LineDataset, TooltipData};
use super::value_objects::{ChartLayout, ChartView, InteractionMode, LegendPosition, SeriesKind};
use crate::domain::market_data::FinancialSeries;
use crate::time_utils::format_date_label;

/// Map a fetched series onto three aligned datasets sharing one label axis.
pub fn build_chart_config(series: &FinancialSeries) -> ChartConfig {
    let entries = series.entries();
    let labels = entries.iter().map(|e| format_date_label(&e.date)).collect();

    let datasets = vec![
        LineDataset::new(SeriesKind::ClosePrice, entries.iter().map(|e| e.close()).collect()),
        LineDataset::new(SeriesKind::Sma20, entries.iter().map(|e| e.sma_20()).collect()),
        LineDataset::new(SeriesKind::Sma50, entries.iter().map(|e| e.sma_50()).collect()),
    ];

    ChartConfig {
        title: format!("{} ETF Price Data", series.symbol()),
        labels,
        datasets,
        legend_position: LegendPosition::Bottom,
        interaction: InteractionOptions::default(),
    }
}

/// Two decimals with ties rounded away from zero (`1.125` -> `1.13`).
///
/// `{:.2}` alone rounds exact ties to even.
pub fn format_cents(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

/// Y-axis tick label: `$1.23M`, `$2.35K`, `$42.50`, sign kept in front.
pub fn format_price_tick(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{}${}M", sign, format_cents(abs / 1_000_000.0))
    } else if abs >= 1_000.0 {
        format!("{}${}K", sign, format_cents(abs / 1_000.0))
    } else {
        format!("{}${}", sign, format_cents(abs))
    }
}

fn nice_num(range: f64, round: bool) -> f64 {
    let exponent = range.log10().floor();
    let fraction = range / 10f64.powf(exponent);
    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * 10f64.powf(exponent)
}

/// Evenly spaced "nice" tick values covering `min..=max`.
pub fn price_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max_ticks < 2 || max <= min {
        return Vec::new();
    }
    let spacing = nice_num(nice_num(max - min, false) / (max_ticks - 1) as f64, true);
    let start = (min / spacing).floor() * spacing;
    let end = (max / spacing).ceil() * spacing;
    let count = ((end - start) / spacing).round() as usize;
    (0..=count)
        .map(|i| start + i as f64 * spacing)
        // 0.1 * 3 style noise would otherwise leak into labels
        .map(|v| (v / spacing).round() * spacing)
        .collect()
}

/// Frame every value of the config, with the y range snapped to nice ticks.
pub fn fit_view(config: &ChartConfig) -> ChartView {
    let (x_min, x_max) = match config.len() {
        0 | 1 => (-0.5, 0.5),
        n => (0.0, (n - 1) as f64),
    };

    let (lo, hi) = config
        .values()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let (y_min, y_max) = if !lo.is_finite() {
        (0.0, 1.0)
    } else if hi - lo < ChartView::MIN_Y_SPAN {
        (lo - 1.0, hi + 1.0)
    } else {
        let ticks = price_ticks(lo, hi, 8);
        match (ticks.first(), ticks.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => (lo, hi),
        }
    };

    ChartView::new(x_min, x_max, y_min, y_max)
}

/// Show every n-th label so neighbours stay `min_spacing_px` apart.
pub fn label_stride(visible: usize, plot_width: f64, min_spacing_px: f64) -> usize {
    if visible == 0 || plot_width <= 0.0 {
        return 1;
    }
    let per_label = plot_width / visible as f64;
    ((min_spacing_px / per_label).ceil() as usize).max(1)
}

/// Pixel polylines for one dataset; every gap starts a new polyline.
pub fn line_segments(
    data: &[Option<f64>],
    view: &ChartView,
    layout: &ChartLayout,
) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (i, value) in data.iter().enumerate() {
        match value.filter(|v| v.is_finite()) {
            Some(v) => current.push((layout.x_to_px(view, i as f64), layout.y_to_px(view, v))),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Label index closest to a pointer position inside the plot area.
pub fn nearest_index(
    len: usize,
    view: &ChartView,
    layout: &ChartLayout,
    px: f64,
    py: f64,
) -> Option<usize> {
    if len == 0 || !layout.contains(px, py) {
        return None;
    }
    let x = layout.px_to_x(view, px).round();
    if x < 0.0 || x >= len as f64 {
        return None;
    }
    Some(x as usize)
}

/// Tooltip for the label under the pointer, listing non-gap values only.
pub fn tooltip_at(
    config: &ChartConfig,
    view: &ChartView,
    layout: &ChartLayout,
    px: f64,
    py: f64,
) -> Option<TooltipData> {
    let index = nearest_index(config.len(), view, layout, px, py)?;
    let lines = config
        .datasets
        .iter()
        .filter_map(|d| {
            let value = d.data.get(index).copied().flatten()?;
            Some((d.kind, format!("{}: {}", d.label, format_cents(value))))
        })
        .collect();

    Some(TooltipData {
        index,
        x: layout.x_to_px(view, index as f64),
        y: py,
        title: config.labels[index].clone(),
        lines,
    })
}

/// Zoom per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Scrolling up zooms in, scrolling down zooms out.
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    if delta_y < 0.0 {
        WHEEL_ZOOM_STEP
    } else if delta_y > 0.0 {
        1.0 / WHEEL_ZOOM_STEP
    } else {
        1.0
    }
}

/// Zoom keeping the data point under `(px, py)` fixed on screen.
pub fn zoom_at_pixel(
    view: &mut ChartView,
    layout: &ChartLayout,
    factor: f64,
    px: f64,
    py: f64,
    mode: InteractionMode,
) {
    let anchor_x = layout.px_to_x(view, px);
    let anchor_y = layout.px_to_y(view, py);
    view.zoom(factor, anchor_x, anchor_y, mode);
}

pub fn pan_by_pixels(view: &mut ChartView, layout: &ChartLayout, dx_px: f64, dy_px: f64, mode: InteractionMode) {
    let (dx, dy) = layout.drag_to_pan(view, dx_px, dy_px);
    view.pan(dx, dy, mode);
}
