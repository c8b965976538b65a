use etf_dashboard_wasm::app::{StatusMessage, status_message};
use etf_dashboard_wasm::application::DashboardView;
use etf_dashboard_wasm::domain::errors::AppError;
use etf_dashboard_wasm::domain::market_data::{FinancialDataEntry, FinancialSeries, Symbol};

fn chart(refreshing: bool, error: Option<AppError>) -> DashboardView {
    let series = FinancialSeries::new(
        Symbol::parse("SPY").unwrap(),
        vec![FinancialDataEntry::new("2024-01-02", 100.0, None, None)],
        1,
    );
    DashboardView::Chart { series, refreshing, error }
}

#[test]
fn stale_data_error_carries_its_kind() {
    let view = chart(false, Some(AppError::Http { status: 404, status_text: "Not Found".into() }));
    let status = status_message(None, &view, "ZZZZ").unwrap();
    assert_eq!(status.kind, Some("network"));
    assert_eq!(status.class(), "status-line error network");
    assert_eq!(status.text, "Update failed, showing SPY: HTTP Error: 404 Not Found");

    let parse = chart(false, Some(AppError::Parse("expected value".into())));
    assert_eq!(status_message(None, &parse, "SPY").unwrap().class(), "status-line error parse");
}

#[test]
fn notice_wins_over_refresh() {
    let status = status_message(Some("Symbol cannot be empty"), &chart(true, None), "").unwrap();
    assert_eq!(
        status,
        StatusMessage { kind: Some("validation"), text: "Symbol cannot be empty".to_string() }
    );
    assert_eq!(status.class(), "status-line error validation");
}

#[test]
fn refresh_is_not_an_error() {
    let status = status_message(None, &chart(true, None), "QQQ").unwrap();
    assert_eq!(status.kind, None);
    assert_eq!(status.class(), "status-line");
    assert_eq!(status.text, "Loading QQQ...");
}

#[test]
fn nothing_to_report() {
    assert_eq!(status_message(None, &chart(false, None), "SPY"), None);
    assert_eq!(status_message(None, &DashboardView::Idle, "SPY"), None);
}
