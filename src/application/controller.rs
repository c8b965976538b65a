use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::debounce::{Debouncer, TimerScheduler};
use super::query::{FetchTicket, FinancialDataQuery, ResolveOutcome};
use crate::domain::{
    errors::AppError,
    logging::{LogComponent, get_logger},
    market_data::{FinancialDataEntry, FinancialDataRepository, FinancialSeries, Symbol},
};
use crate::infrastructure::config::{DashboardConfig, InputMode};
use crate::{log_debug, log_info};

/// Runs a detached local future (`spawn_local` in the browser).
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

#[derive(Debug)]
pub struct DashboardState {
    pub raw_symbol: String,
    pub settled_symbol: String,
    pub query: FinancialDataQuery,
    pub notice: Option<String>,
}

/// What the chart area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Idle,
    Loading { symbol: String },
    Failed { symbol: String, error: AppError },
    /// Data on screen; `refreshing` while a newer fetch is outstanding
    Chart { series: FinancialSeries, refreshing: bool, error: Option<AppError> },
}

impl DashboardView {
    pub fn series(&self) -> Option<&FinancialSeries> {
        match self {
            DashboardView::Chart { series, .. } => Some(series),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub raw_symbol: String,
    pub settled_symbol: String,
    pub notice: Option<String>,
    pub view: DashboardView,
}

/// Owns the symbol input, the debouncer and the keyed query, and publishes a
/// snapshot after every change.
pub struct DashboardController<R, S: TimerScheduler> {
    repository: R,
    input_mode: InputMode,
    state: RefCell<DashboardState>,
    debouncer: RefCell<Debouncer<String, S>>,
    spawner: Spawner,
    subscriber: RefCell<Option<Rc<dyn Fn(&DashboardSnapshot)>>>,
    this: Weak<Self>,
}

impl<R, S> DashboardController<R, S>
where
    R: FinancialDataRepository + 'static,
    S: TimerScheduler + 'static,
{
    pub fn new(config: &DashboardConfig, repository: R, scheduler: S, spawner: Spawner) -> Rc<Self> {
        let default_symbol = config.default_symbol.value().to_string();
        Rc::new_cyclic(|this: &Weak<Self>| {
            let target = this.clone();
            let debouncer = Debouncer::new(config.debounce, scheduler, move |value: String| {
                if let Some(controller) = target.upgrade() {
                    controller.settle(value, false);
                }
            });
            Self {
                repository,
                input_mode: config.input_mode,
                state: RefCell::new(DashboardState {
                    raw_symbol: default_symbol.clone(),
                    settled_symbol: default_symbol,
                    query: FinancialDataQuery::new(),
                    notice: None,
                }),
                debouncer: RefCell::new(debouncer),
                spawner,
                subscriber: RefCell::new(None),
                this: this.clone(),
            }
        })
    }

    /// Fetch the default symbol.
    pub fn start(&self) {
        let symbol = self.state.borrow().settled_symbol.clone();
        log_info!(LogComponent::Application("Dashboard"), "Starting with {}", symbol);
        self.settle(symbol, false);
    }

    /// Every keystroke: raw symbol now, settled symbol after the quiet period.
    pub fn handle_symbol_change(&self, input: &str) {
        let value = input.to_uppercase();
        self.state.borrow_mut().raw_symbol = value.clone();
        if self.input_mode == InputMode::Debounced {
            self.debouncer.borrow_mut().schedule(value);
        }
        self.publish();
    }

    /// Update button: settle immediately, refetching when the key is unchanged.
    pub fn submit(&self) {
        self.debouncer.borrow_mut().cancel_pending();
        let raw = self.state.borrow().raw_symbol.clone();
        self.settle(raw, true);
    }

    pub fn cancel_pending(&self) -> bool {
        self.debouncer.borrow_mut().cancel_pending()
    }

    pub fn is_debouncing(&self) -> bool {
        self.debouncer.borrow().is_pending()
    }

    pub fn subscribe(&self, subscriber: impl Fn(&DashboardSnapshot) + 'static) {
        *self.subscriber.borrow_mut() = Some(Rc::new(subscriber));
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.borrow();
        let query = &state.query;
        let key = query.key().map(|k| k.value().to_string()).unwrap_or_default();

        let view = match (query.data(), query.error()) {
            (Some(series), error) => DashboardView::Chart {
                series: series.clone(),
                refreshing: query.is_fetching(),
                error: error.cloned(),
            },
            (None, _) if query.is_fetching() => DashboardView::Loading { symbol: key },
            (None, Some(error)) => DashboardView::Failed { symbol: key, error: error.clone() },
            (None, None) => DashboardView::Idle,
        };

        DashboardSnapshot {
            raw_symbol: state.raw_symbol.clone(),
            settled_symbol: state.settled_symbol.clone(),
            notice: state.notice.clone(),
            view,
        }
    }

    fn settle(&self, value: String, refresh: bool) {
        let ticket = {
            let mut state = self.state.borrow_mut();
            state.settled_symbol = value.clone();
            match Symbol::parse(&value) {
                Ok(symbol) => {
                    state.notice = None;
                    let ticket = state.query.set_key(symbol);
                    if ticket.is_none() && refresh { state.query.refetch() } else { ticket }
                }
                Err(err) => {
                    log_debug!(LogComponent::Application("Dashboard"), "Not fetching {:?}: {}", value, err);
                    state.notice = Some(notice_text(&err));
                    None
                }
            }
        };

        if let Some(ticket) = ticket {
            self.dispatch(ticket);
        }
        self.publish();
    }

    fn dispatch(&self, ticket: FetchTicket) {
        log_debug!(
            LogComponent::Application("Dashboard"),
            "Request #{} for {}",
            ticket.id(),
            ticket.key()
        );
        let request = self.repository.fetch_financial_data(ticket.key());
        let this = self.this.clone();
        (self.spawner)(
            async move {
                let result = request.await;
                if let Some(controller) = this.upgrade() {
                    controller.apply(ticket, result);
                }
            }
            .boxed_local(),
        );
    }

    fn apply(&self, ticket: FetchTicket, result: Result<Vec<FinancialDataEntry>, AppError>) {
        if let Err(err) = &result {
            get_logger().error(
                LogComponent::Application("Dashboard"),
                &format!("Fetch for {} failed: {}", ticket.key(), err),
            );
        }
        let outcome = self.state.borrow_mut().query.resolve(&ticket, result);
        match outcome {
            ResolveOutcome::Applied => self.publish(),
            ResolveOutcome::Superseded => {
                log_debug!(
                    LogComponent::Application("Dashboard"),
                    "Discarded response #{} for {}",
                    ticket.id(),
                    ticket.key()
                );
            }
        }
    }

    fn publish(&self) {
        let subscriber = self.subscriber.borrow().clone();
        if let Some(subscriber) = subscriber {
            subscriber(&self.snapshot());
        }
    }
}

fn notice_text(err: &AppError) -> String {
    match err {
        AppError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{ManualScheduler, ScriptedRepository, entries};
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use std::time::Duration;

    struct Harness {
        controller: Rc<DashboardController<ScriptedRepository, ManualScheduler>>,
        repository: ScriptedRepository,
        clock: ManualScheduler,
        pool: LocalPool,
        published: Rc<RefCell<Vec<DashboardSnapshot>>>,
    }

    impl Harness {
        fn new(input_mode: InputMode) -> Self {
            let config = DashboardConfig {
                debounce: Duration::from_millis(1000),
                input_mode,
                ..DashboardConfig::default()
            };
            let pool = LocalPool::new();
            let spawner = pool.spawner();
            let repository = ScriptedRepository::default();
            let clock = ManualScheduler::default();
            let controller = DashboardController::new(
                &config,
                repository.clone(),
                clock.clone(),
                Rc::new(move |fut: LocalBoxFuture<'static, ()>| spawner.spawn_local(fut).unwrap()),
            );
            let published = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&published);
            controller.subscribe(move |s| sink.borrow_mut().push(s.clone()));
            Self { controller, repository, clock, pool, published }
        }

        fn respond(&mut self, symbol: &str, result: Result<Vec<FinancialDataEntry>, AppError>) {
            self.pool.run_until_stalled();
            self.repository.respond(symbol, result);
            self.pool.run_until_stalled();
        }

        fn view(&self) -> DashboardView {
            self.controller.snapshot().view
        }
    }

    #[test]
    fn start_fetches_default_symbol_and_shows_chart() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        assert_eq!(h.repository.requested(), vec!["SPY"]);
        assert_eq!(h.view(), DashboardView::Loading { symbol: "SPY".into() });

        h.respond("SPY", Ok(entries(&["2024-01-02", "2024-01-03"])));
        match h.view() {
            DashboardView::Chart { series, refreshing, error } => {
                assert_eq!(series.symbol().value(), "SPY");
                assert_eq!(series.len(), 2);
                assert!(!refreshing);
                assert!(error.is_none());
            }
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn typing_burst_fetches_once_for_last_value() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.respond("SPY", Ok(entries(&["2024-01-02"])));

        h.controller.handle_symbol_change("q");
        assert_eq!(h.controller.snapshot().raw_symbol, "Q");
        h.clock.advance(100);
        h.controller.handle_symbol_change("qq");
        h.clock.advance(100);
        h.controller.handle_symbol_change("qqq");
        assert_eq!(h.controller.snapshot().raw_symbol, "QQQ");
        assert_eq!(h.controller.snapshot().settled_symbol, "SPY");

        h.clock.advance(1000);
        h.pool.run_until_stalled();
        assert_eq!(h.repository.requested(), vec!["SPY", "QQQ"]);
        assert_eq!(h.controller.snapshot().settled_symbol, "QQQ");

        // stale chart stays up while QQQ loads
        match h.view() {
            DashboardView::Chart { series, refreshing, .. } => {
                assert_eq!(series.symbol().value(), "SPY");
                assert!(refreshing);
            }
            other => panic!("expected stale chart, got {:?}", other),
        }
    }

    #[test]
    fn raw_symbol_is_published_on_every_keystroke() {
        let h = Harness::new(InputMode::Debounced);
        h.controller.handle_symbol_change("v");
        h.controller.handle_symbol_change("vo");
        let raws: Vec<String> = h.published.borrow().iter().map(|s| s.raw_symbol.clone()).collect();
        assert_eq!(raws, vec!["V", "VO"]);
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.controller.handle_symbol_change("qqq");
        h.clock.advance(1000);
        h.pool.run_until_stalled();
        assert_eq!(h.repository.requested(), vec!["SPY", "QQQ"]);

        h.respond("QQQ", Ok(entries(&["2024-01-02"])));
        h.respond("SPY", Ok(entries(&["2024-01-02", "2024-01-03", "2024-01-04"])));

        let series = h.view().series().cloned().unwrap();
        assert_eq!(series.symbol().value(), "QQQ");
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn failure_without_data_is_failed_view() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.respond("SPY", Err(AppError::Http { status: 500, status_text: "Internal Server Error".into() }));

        assert_eq!(
            h.view(),
            DashboardView::Failed {
                symbol: "SPY".into(),
                error: AppError::Http { status: 500, status_text: "Internal Server Error".into() }
            }
        );
    }

    #[test]
    fn failure_with_data_keeps_chart_and_reports_error() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.respond("SPY", Ok(entries(&["2024-01-02"])));
        h.controller.handle_symbol_change("zzzz");
        h.clock.advance(1000);
        h.respond("ZZZZ", Err(AppError::Http { status: 404, status_text: "Not Found".into() }));

        match h.view() {
            DashboardView::Chart { series, refreshing, error } => {
                assert_eq!(series.symbol().value(), "SPY");
                assert!(!refreshing);
                assert_eq!(error, Some(AppError::Http { status: 404, status_text: "Not Found".into() }));
            }
            other => panic!("expected stale chart, got {:?}", other),
        }
    }

    #[test]
    fn empty_or_invalid_input_is_not_fetched() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.respond("SPY", Ok(entries(&["2024-01-02"])));

        h.controller.handle_symbol_change("");
        h.clock.advance(1000);
        assert_eq!(h.controller.snapshot().settled_symbol, "");
        assert_eq!(h.controller.snapshot().notice.as_deref(), Some("Symbol cannot be empty"));

        h.controller.handle_symbol_change("a/b");
        h.clock.advance(1000);
        h.pool.run_until_stalled();
        assert_eq!(h.repository.requested(), vec!["SPY"]);
        assert!(h.view().series().is_some());
    }

    #[test]
    fn returning_to_same_symbol_does_not_refetch() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.respond("SPY", Ok(entries(&["2024-01-02"])));
        h.controller.handle_symbol_change("SP");
        h.clock.advance(300);
        h.controller.handle_symbol_change("SPY");
        h.clock.advance(1000);
        h.pool.run_until_stalled();
        assert_eq!(h.repository.requested(), vec!["SPY"]);
    }

    #[test]
    fn submit_refetches_current_symbol() {
        let mut h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.controller.submit();
        // in flight, no duplicate
        assert_eq!(h.repository.requested(), vec!["SPY"]);

        h.respond("SPY", Ok(entries(&["2024-01-02"])));
        h.controller.submit();
        assert_eq!(h.repository.requested(), vec!["SPY", "SPY"]);
    }

    #[test]
    fn submit_flushes_pending_debounce() {
        let h = Harness::new(InputMode::Debounced);
        h.controller.start();
        h.controller.handle_symbol_change("dia");
        assert!(h.controller.is_debouncing());
        h.controller.submit();
        assert!(!h.controller.is_debouncing());
        assert_eq!(h.repository.requested(), vec!["SPY", "DIA"]);

        h.clock.advance(5000);
        assert_eq!(h.repository.requested(), vec!["SPY", "DIA"]);
    }

    #[test]
    fn explicit_mode_waits_for_update() {
        let h = Harness::new(InputMode::ExplicitUpdate);
        h.controller.start();
        h.controller.handle_symbol_change("iwm");
        h.clock.advance(5000);
        assert_eq!(h.repository.requested(), vec!["SPY"]);
        assert_eq!(h.controller.snapshot().raw_symbol, "IWM");

        h.controller.submit();
        assert_eq!(h.repository.requested(), vec!["SPY", "IWM"]);
    }
}
