use futures::future::LocalBoxFuture;
use leptos::ev::EventDescriptor;
use leptos::html::Canvas;
use leptos::*;
use std::rc::Rc;
use strum::IntoEnumIterator;
use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent};

use crate::{
    application::{DashboardController, DashboardSnapshot, DashboardView, GlooTimerScheduler},
    domain::{
        chart::{
            ChartLayout, InteractionOptions, SeriesKind, build_chart_config, fit_view, pan_by_pixels,
            tooltip_at, wheel_zoom_factor, zoom_at_pixel,
        },
        logging::{LogComponent, get_logger},
    },
    event_utils::{
        EventListenerHandle, EventOptions, event_listener_with_options, window_event_listener_with_options,
    },
    global_state::{
        chart_config, chart_revision, chart_view, dashboard_view, is_dragging, last_pointer, notice,
        pinch_distance, raw_symbol, settled_symbol, tooltip,
    },
    infrastructure::{DashboardApiClient, DashboardConfig, rendering::LineChartRenderer},
};

pub type Dashboard = Rc<DashboardController<DashboardApiClient, GlooTimerScheduler>>;

/// Backing store size until the first fit to the displayed size.
pub const CANVAS_WIDTH: u32 = 960;
pub const CANVAS_HEIGHT: u32 = 500;

/// Push a controller snapshot into the global signals.
///
/// A series with a new revision replaces the chart config and resets the view.
pub fn publish_snapshot(snapshot: &DashboardSnapshot) {
    if raw_symbol().get_untracked() != snapshot.raw_symbol {
        raw_symbol().set(snapshot.raw_symbol.clone());
    }
    if settled_symbol().get_untracked() != snapshot.settled_symbol {
        settled_symbol().set(snapshot.settled_symbol.clone());
    }
    notice().set(snapshot.notice.clone());

    if let Some(series) = snapshot.view.series() {
        if series.revision() != chart_revision().get_untracked() {
            let config = build_chart_config(series);
            tooltip().set(None);
            chart_view().set(fit_view(&config));
            chart_config().set(Some(config));
            chart_revision().set(series.revision());
        }
    }
    dashboard_view().set(snapshot.view.clone());
}

#[component]
pub fn App(config: DashboardConfig) -> impl IntoView {
    let controller: Dashboard = DashboardController::new(
        &config,
        DashboardApiClient::from_config(&config),
        GlooTimerScheduler,
        Rc::new(|fut: LocalBoxFuture<'static, ()>| wasm_bindgen_futures::spawn_local(fut)),
    );
    controller.subscribe(publish_snapshot);
    publish_snapshot(&controller.snapshot());
    controller.start();

    get_logger().info(
        LogComponent::Presentation("App"),
        &format!("Dashboard mounted (api {}, input mode {})", config.api_base_url, config.input_mode),
    );

    let controller = store_value(controller);
    on_cleanup(move || {
        controller.try_with_value(|c| c.cancel_pending());
    });

    view! {
        <style>
            {r#"
            .etf-dashboard {
                font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
                padding: 32px;
                color: #1f2937;
                max-width: 1040px;
                margin: 0 auto;
            }

            .etf-dashboard h1 {
                font-size: 24px;
                font-weight: 700;
                margin: 0 0 8px 0;
            }

            .symbol-form {
                display: flex;
                align-items: center;
                gap: 8px;
            }

            .symbol-input {
                padding: 8px 16px;
                border: 1px solid #d1d5db;
                border-radius: 6px;
                font-size: 14px;
                text-transform: uppercase;
            }

            .symbol-input:focus {
                outline: none;
                box-shadow: 0 0 0 2px #3b82f6;
            }

            .update-btn {
                padding: 8px 16px;
                background: #3b82f6;
                color: white;
                border: none;
                border-radius: 6px;
                cursor: pointer;
                font-size: 14px;
            }

            .update-btn:hover {
                background: #2563eb;
            }

            .status-line {
                min-height: 20px;
                margin: 8px 0;
                font-size: 13px;
                color: #6b7280;
            }

            .status-line.error {
                color: #b91c1c;
            }

            .status-line.validation {
                color: #b45309;
            }

            .chart-panel {
                position: relative;
                width: 100%;
                height: 500px;
            }

            .chart-canvas {
                width: 100%;
                height: 100%;
                cursor: grab;
                touch-action: none;
            }

            .chart-canvas.dragging {
                cursor: grabbing;
            }

            .chart-placeholder {
                display: flex;
                align-items: center;
                justify-content: center;
                height: 100%;
                border: 1px dashed #d1d5db;
                border-radius: 6px;
                color: #6b7280;
            }

            .chart-placeholder.error {
                color: #b91c1c;
                border-color: #fca5a5;
            }

            .spinner {
                width: 18px;
                height: 18px;
                margin-right: 10px;
                border: 3px solid #e5e7eb;
                border-top-color: #3b82f6;
                border-radius: 50%;
                animation: spin 0.8s linear infinite;
            }

            @keyframes spin {
                to { transform: rotate(360deg); }
            }

            .legend {
                margin-top: 16px;
                padding: 16px;
                background: #f3f4f6;
                border-radius: 6px;
            }

            .legend h2 {
                font-size: 18px;
                font-weight: 600;
                margin: 0 0 8px 0;
            }

            .legend ul {
                margin: 0;
                padding-left: 16px;
            }

            .legend .swatch {
                display: inline-block;
                width: 10px;
                height: 10px;
                margin-right: 6px;
                border-radius: 2px;
            }
            "#}
        </style>
        <div class="etf-dashboard">
            <Header controller=controller />
            <StatusLine />
            <ChartPanel />
            <Legend />
        </div>
    }
}

#[component]
fn Header(controller: StoredValue<Dashboard>) -> impl IntoView {
    let on_input = move |ev: ev::Event| {
        let value = event_target_value(&ev);
        controller.with_value(|c| c.handle_symbol_change(&value));
    };
    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" {
            controller.with_value(|c| c.submit());
        }
    };

    view! {
        <div class="header">
            <h1>"ETF Dashboard"</h1>
            <div class="symbol-form">
                <input
                    type="text"
                    class="symbol-input"
                    placeholder="Enter ETF Symbol (e.g., SPY)"
                    prop:value=move || raw_symbol().get()
                    on:input=on_input
                    on:keydown=on_keydown
                />
                <button class="update-btn" on:click=move |_| controller.with_value(|c| c.submit())>
                    "Update"
                </button>
            </div>
        </div>
    }
}

/// One line of status text; `kind` is the `AppError::kind` label for errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: Option<&'static str>,
    pub text: String,
}

impl StatusMessage {
    pub fn class(&self) -> String {
        match self.kind {
            Some(kind) => format!("status-line error {}", kind),
            None => "status-line".to_string(),
        }
    }
}

/// Validation notice first, then background refresh, then a stale-data error.
pub fn status_message(notice: Option<&str>, view: &DashboardView, settled_symbol: &str) -> Option<StatusMessage> {
    if let Some(text) = notice {
        return Some(StatusMessage { kind: Some("validation"), text: text.to_string() });
    }
    match view {
        DashboardView::Chart { refreshing: true, .. } => {
            Some(StatusMessage { kind: None, text: format!("Loading {}...", settled_symbol) })
        }
        DashboardView::Chart { error: Some(error), series, .. } => Some(StatusMessage {
            kind: Some(error.kind()),
            text: format!("Update failed, showing {}: {}", series.symbol(), error),
        }),
        _ => None,
    }
}

#[component]
fn StatusLine() -> impl IntoView {
    let status = move || {
        let notice = notice().get();
        let settled = settled_symbol().get();
        dashboard_view().with(|view| status_message(notice.as_deref(), view, &settled))
    };

    view! {
        <div class=move || status().map(|s| s.class()).unwrap_or_else(|| "status-line".to_string())>
            {move || status().map(|s| s.text).unwrap_or_default()}
        </div>
    }
}

#[component]
fn ChartPanel() -> impl IntoView {
    view! {
        <div class="chart-panel">
            <Show
                when=move || dashboard_view().with(|v| v.series().is_some())
                fallback=|| view! { <ChartPlaceholder /> }
            >
                <ChartCanvas />
            </Show>
        </div>
    }
}

#[component]
fn ChartPlaceholder() -> impl IntoView {
    move || {
        dashboard_view().with(|view| match view {
            DashboardView::Loading { symbol } => view! {
                <div class="chart-placeholder">
                    <div class="spinner"></div>
                    {format!("Loading {} data...", symbol)}
                </div>
            }
            .into_view(),
            DashboardView::Failed { symbol, error } => view! {
                <div class=format!("chart-placeholder error {}", error.kind())>
                    {format!("Could not load {}: {}", symbol, error)}
                </div>
            }
            .into_view(),
            _ => view! {
                <div class="chart-placeholder">"Enter an ETF symbol to load data."</div>
            }
            .into_view(),
        })
    }
}

#[component]
fn ChartCanvas() -> impl IntoView {
    let canvas_ref = create_node_ref::<Canvas>();
    let renderer = store_value(None::<LineChartRenderer>);
    let listeners = store_value(Vec::<EventListenerHandle>::new());
    let ready = create_rw_signal(false);
    let resized = create_rw_signal(0u64);

    canvas_ref.on_load(move |canvas| {
        let element: HtmlCanvasElement = (*canvas).clone();
        match LineChartRenderer::new(element.clone()) {
            Ok(r) => renderer.set_value(Some(r)),
            Err(e) => {
                get_logger().error(LogComponent::Presentation("ChartCanvas"), &e.to_string());
                return;
            }
        }

        let mut handles = attach_listeners(&element);
        let on_resize = window_event_listener_with_options(ev::resize, &EventOptions::default(), move |_| {
            let changed = renderer.try_with_value(|r| r.as_ref().is_some_and(LineChartRenderer::fit_to_display));
            if changed == Some(true) {
                resized.update(|n| *n += 1);
            }
        });
        handles.push(on_resize);
        listeners.set_value(handles);
        ready.set(true);
    });

    on_cleanup(move || {
        listeners.try_update_value(|handles| handles.drain(..).for_each(EventListenerHandle::remove));
        is_dragging().set(false);
        pinch_distance().set(None);
    });

    create_effect(move |_| {
        if !ready.get() {
            return;
        }
        resized.get();
        let view = chart_view().get();
        let tip = tooltip().get();
        chart_config().with(|config| {
            let Some(config) = config else { return };
            renderer.with_value(|r| {
                if let Some(r) = r {
                    r.fit_to_display();
                    if let Err(e) = r.render(config, &view, tip.as_ref()) {
                        get_logger().error(LogComponent::Presentation("ChartCanvas"), &e.to_string());
                    }
                }
            });
        });
    });

    let on_mouse_down = move |ev: MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some((_, point)) = pointer(&canvas_ref, ev.client_x(), ev.client_y()) {
            is_dragging().set(true);
            last_pointer().set(point);
            tooltip().set(None);
        }
    };
    let on_mouse_move = move |ev: MouseEvent| {
        let Some((layout, point)) = pointer(&canvas_ref, ev.client_x(), ev.client_y()) else { return };
        if is_dragging().get_untracked() {
            drag_to(&layout, point);
        } else {
            hover(&layout, point);
        }
    };

    view! {
        <canvas
            node_ref=canvas_ref
            class="chart-canvas"
            class:dragging=move || is_dragging().get()
            width=CANVAS_WIDTH
            height=CANVAS_HEIGHT
            on:mousedown=on_mouse_down
            on:mousemove=on_mouse_move
            on:mouseleave=move |_| tooltip().set(None)
            on:dblclick=move |_| reset_view()
        />
    }
}

/// Wheel and touch need non-passive listeners to stop the page scrolling.
fn attach_listeners(canvas: &HtmlCanvasElement) -> Vec<EventListenerHandle> {
    let target: &web_sys::EventTarget = canvas.as_ref();
    let mut handles = Vec::new();

    let el = canvas.clone();
    handles.push(event_listener_with_options(target, ev::wheel, &EventOptions::active(), move |ev: WheelEvent| {
        let (layout, point) = locate(&el, ev.client_x(), ev.client_y());
        if !layout.contains(point.0, point.1) {
            return;
        }
        ev.prevent_default();
        zoom_by(&layout, wheel_zoom_factor(ev.delta_y()), point, false);
    }));

    let el = canvas.clone();
    handles.push(event_listener_with_options(target, ev::touchstart, &EventOptions::active(), move |ev: TouchEvent| {
        let (_, points) = touch_points(&el, &ev);
        begin_touch(&points);
    }));

    let el = canvas.clone();
    handles.push(event_listener_with_options(target, ev::touchmove, &EventOptions::active(), move |ev: TouchEvent| {
        ev.prevent_default();
        let (layout, points) = touch_points(&el, &ev);
        match points.as_slice() {
            [a, b] => {
                let distance = (b.0 - a.0).hypot(b.1 - a.1);
                if let Some(previous) = pinch_distance().get_untracked().filter(|d| *d > 0.0) {
                    let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
                    zoom_by(&layout, distance / previous, mid, true);
                }
                pinch_distance().set(Some(distance));
            }
            [point] if is_dragging().get_untracked() => drag_to(&layout, *point),
            _ => {}
        }
    }));

    handles.push(touch_release_listener(canvas, ev::touchend));
    handles.push(touch_release_listener(canvas, ev::touchcancel));

    handles.push(window_event_listener_with_options(ev::mouseup, &EventOptions::default(), move |_| {
        if is_dragging().get_untracked() {
            is_dragging().set(false);
        }
    }));

    handles
}

/// Lifting one finger of a pinch continues as a one-finger pan.
fn touch_release_listener<E>(canvas: &HtmlCanvasElement, event: E) -> EventListenerHandle
where
    E: EventDescriptor<EventType = TouchEvent> + 'static,
{
    let el = canvas.clone();
    event_listener_with_options(canvas.as_ref(), event, &EventOptions::default(), move |ev: TouchEvent| {
        let (_, points) = touch_points(&el, &ev);
        begin_touch(&points);
    })
}

fn begin_touch(points: &[(f64, f64)]) {
    match points {
        [point] => {
            is_dragging().set(true);
            last_pointer().set(*point);
            pinch_distance().set(None);
        }
        [a, b, ..] => {
            is_dragging().set(false);
            pinch_distance().set(Some((b.0 - a.0).hypot(b.1 - a.1)));
        }
        [] => {
            is_dragging().set(false);
            pinch_distance().set(None);
        }
    }
    tooltip().set(None);
}

fn interaction() -> Option<InteractionOptions> {
    chart_config().with_untracked(|c| c.as_ref().map(|c| c.interaction))
}

fn drag_to(layout: &ChartLayout, point: (f64, f64)) {
    let Some(options) = interaction().filter(|o| o.pan.enabled) else { return };
    let (last_x, last_y) = last_pointer().get_untracked();
    chart_view().update(|view| pan_by_pixels(view, layout, point.0 - last_x, point.1 - last_y, options.pan.mode));
    last_pointer().set(point);
}

fn zoom_by(layout: &ChartLayout, factor: f64, point: (f64, f64), pinch: bool) {
    let Some(options) = interaction() else { return };
    let enabled = if pinch { options.zoom.pinch } else { options.zoom.wheel };
    if !enabled || factor == 1.0 {
        return;
    }
    chart_view().update(|view| zoom_at_pixel(view, layout, factor, point.0, point.1, options.zoom.mode));
}

fn hover(layout: &ChartLayout, point: (f64, f64)) {
    let view = chart_view().get_untracked();
    let tip = chart_config().with_untracked(|c| {
        c.as_ref().and_then(|config| tooltip_at(config, &view, layout, point.0, point.1))
    });
    let unchanged = tooltip().with_untracked(|current| match (current, &tip) {
        (Some(a), Some(b)) => a.index == b.index && a.y == b.y,
        (None, None) => true,
        _ => false,
    });
    if !unchanged {
        tooltip().set(tip);
    }
}

fn reset_view() {
    chart_config().with_untracked(|config| {
        if let Some(config) = config {
            chart_view().set(fit_view(config));
        }
    });
}

/// Client coordinates to the CSS-pixel layout the renderer draws in.
fn locate(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (ChartLayout, (f64, f64)) {
    let rect = canvas.get_bounding_client_rect();
    let layout = ChartLayout::new(rect.width(), rect.height());
    (layout, (client_x as f64 - rect.left(), client_y as f64 - rect.top()))
}

fn pointer(canvas_ref: &NodeRef<Canvas>, client_x: i32, client_y: i32) -> Option<(ChartLayout, (f64, f64))> {
    let canvas = canvas_ref.get_untracked()?;
    Some(locate(&canvas, client_x, client_y))
}

fn touch_points(canvas: &HtmlCanvasElement, ev: &TouchEvent) -> (ChartLayout, Vec<(f64, f64)>) {
    let (layout, _) = locate(canvas, 0, 0);
    let touches = ev.touches();
    let points: Vec<(f64, f64)> = (0..touches.length())
        .filter_map(|i| touches.get(i))
        .map(|t| locate(canvas, t.client_x(), t.client_y()).1)
        .collect();
    (layout, points)
}

#[component]
fn Legend() -> impl IntoView {
    view! {
        <div class="legend">
            <h2>"Legend:"</h2>
            <ul>
                {SeriesKind::iter()
                    .map(|kind| {
                        view! {
                            <li>
                                <span class="swatch" style:background-color=kind.border_color().to_string()></span>
                                <strong>{format!("{}:", kind.short_name())}</strong>
                                " "
                                {kind.description()}
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}
