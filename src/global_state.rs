use crate::application::DashboardView;
use crate::domain::chart::{ChartConfig, ChartView, TooltipData};
use crate::domain::market_data::Symbol;
use crate::global_signals;
use leptos::*;
use once_cell::sync::OnceCell;

pub struct Globals {
    pub raw_symbol: RwSignal<String>,
    pub settled_symbol: RwSignal<String>,
    pub notice: RwSignal<Option<String>>,
    pub dashboard_view: RwSignal<DashboardView>,
    pub chart_config: RwSignal<Option<ChartConfig>>,
    pub chart_view: RwSignal<ChartView>,
    /// Revision of the series currently drawn; a change resets the view
    pub chart_revision: RwSignal<u64>,
    pub tooltip: RwSignal<Option<TooltipData>>,
    pub is_dragging: RwSignal<bool>,
    pub last_pointer: RwSignal<(f64, f64)>,
    pub pinch_distance: RwSignal<Option<f64>>,
}

static GLOBALS: OnceCell<Globals> = OnceCell::new();

pub fn globals() -> &'static Globals {
    GLOBALS.get_or_init(|| Globals {
        raw_symbol: create_rw_signal(Symbol::DEFAULT.to_string()),
        settled_symbol: create_rw_signal(Symbol::DEFAULT.to_string()),
        notice: create_rw_signal(None),
        dashboard_view: create_rw_signal(DashboardView::Idle),
        chart_config: create_rw_signal(None),
        chart_view: create_rw_signal(ChartView::default()),
        chart_revision: create_rw_signal(0),
        tooltip: create_rw_signal(None),
        is_dragging: create_rw_signal(false),
        last_pointer: create_rw_signal((0.0, 0.0)),
        pinch_distance: create_rw_signal(None),
    })
}

global_signals! {
    pub raw_symbol => raw_symbol: String,
    pub settled_symbol => settled_symbol: String,
    pub notice => notice: Option<String>,
    pub dashboard_view => dashboard_view: DashboardView,
    pub chart_config => chart_config: Option<ChartConfig>,
    pub chart_view => chart_view: ChartView,
    pub chart_revision => chart_revision: u64,
    pub tooltip => tooltip: Option<TooltipData>,
    pub is_dragging => is_dragging: bool,
    pub last_pointer => last_pointer: (f64, f64),
    pub pinch_distance => pinch_distance: Option<f64>,
}
