use etf_dashboard_wasm::domain::chart::{
    ChartConfig, ChartLayout, ChartView, InteractionMode, build_chart_config, fit_view, line_segments,
    pan_by_pixels, zoom_at_pixel,
};
use etf_dashboard_wasm::domain::market_data::{FinancialDataEntry, FinancialSeries, Symbol};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

fn config(closes: &[f64]) -> ChartConfig {
    let entries = closes
        .iter()
        .enumerate()
        .map(|(i, c)| FinancialDataEntry::new(format!("2024-02-{:02}", i + 1), *c, None, None))
        .collect();
    build_chart_config(&FinancialSeries::new(Symbol::parse("SPY").unwrap(), entries, 1))
}

#[test]
fn fit_frames_every_label_and_value() {
    let view = fit_view(&config(&[101.0, 99.5, 104.25, 100.0]));
    assert_eq!((view.x_min, view.x_max), (0.0, 3.0));
    assert!(view.y_min <= 99.5);
    assert!(view.y_max >= 104.25);
}

#[test]
fn fit_handles_degenerate_series() {
    let single = fit_view(&config(&[50.0]));
    assert!(single.x_span() > 0.0 && single.y_span() > 0.0);

    let flat = fit_view(&config(&[10.0, 10.0, 10.0]));
    assert_eq!((flat.y_min, flat.y_max), (9.0, 11.0));

    let empty = fit_view(&config(&[]));
    assert_eq!((empty.y_min, empty.y_max), (0.0, 1.0));
}

#[test]
fn axis_modes_limit_interaction() {
    let mut view = ChartView::new(0.0, 10.0, 0.0, 10.0);
    view.pan(2.0, 3.0, InteractionMode::X);
    assert_eq!((view.x_min, view.y_min), (2.0, 0.0));
    view.zoom(2.0, 7.0, 5.0, InteractionMode::Y);
    assert_eq!(view.x_span(), 10.0);
    assert_eq!(view.y_span(), 5.0);
}

#[test]
fn zoom_never_collapses_window() {
    let mut view = ChartView::new(0.0, 10.0, 0.0, 10.0);
    for _ in 0..200 {
        view.zoom(3.0, 5.0, 5.0, InteractionMode::XY);
    }
    assert!(view.x_span() >= ChartView::MIN_X_SPAN);
    assert!(view.y_span() >= ChartView::MIN_Y_SPAN);
}

#[quickcheck]
fn wheel_zoom_keeps_pointer_anchor(fx: u8, fy: u8, notches: i8) -> TestResult {
    if notches == 0 {
        return TestResult::discard();
    }
    let layout = ChartLayout::default();
    let mut view = ChartView::new(0.0, 250.0, 380.0, 480.0);
    let px = layout.plot_left() + layout.plot_width() * fx as f64 / 255.0;
    let py = layout.plot_top() + layout.plot_height() * fy as f64 / 255.0;
    let before = (layout.px_to_x(&view, px), layout.px_to_y(&view, py));

    let factor = 1.1f64.powi(notches.clamp(-20, 20) as i32);
    zoom_at_pixel(&mut view, &layout, factor, px, py, InteractionMode::XY);

    let after = (layout.px_to_x(&view, px), layout.px_to_y(&view, py));
    TestResult::from_bool((after.0 - before.0).abs() < 1e-6 && (after.1 - before.1).abs() < 1e-6)
}

#[quickcheck]
fn drag_there_and_back_restores_view(dx: i16, dy: i16) -> bool {
    let layout = ChartLayout::default();
    let original = ChartView::new(10.0, 60.0, 100.0, 200.0);
    let mut view = original;
    pan_by_pixels(&mut view, &layout, dx as f64, dy as f64, InteractionMode::XY);
    pan_by_pixels(&mut view, &layout, -(dx as f64), -(dy as f64), InteractionMode::XY);
    (view.x_min - original.x_min).abs() < 1e-6 && (view.y_max - original.y_max).abs() < 1e-6
}

#[quickcheck]
fn segments_cover_exactly_the_present_values(data: Vec<Option<u16>>) -> bool {
    let data: Vec<Option<f64>> = data.into_iter().map(|v| v.map(f64::from)).collect();
    let layout = ChartLayout::default();
    let view = ChartView::new(0.0, data.len().max(2) as f64, 0.0, 70_000.0);
    let segments = line_segments(&data, &view, &layout);

    let present = data.iter().filter(|v| v.is_some()).count();
    let runs = data
        .iter()
        .enumerate()
        .filter(|(i, v)| v.is_some() && (*i == 0 || data[i - 1].is_none()))
        .count();

    segments.iter().map(Vec::len).sum::<usize>() == present
        && segments.len() == runs
        && segments.iter().all(|s| !s.is_empty())
}
