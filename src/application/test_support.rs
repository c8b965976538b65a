//! Deterministic timer and repository doubles for controller tests.

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::debounce::TimerScheduler;
use crate::domain::errors::AppError;
use crate::domain::market_data::{FinancialDataEntry, FinancialDataRepository, Symbol};

struct ScheduledTask {
    id: u64,
    due_ms: u64,
    task: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualClock {
    now_ms: u64,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

/// Virtual clock: tasks run only inside `advance`.
#[derive(Clone, Default)]
pub(crate) struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub(crate) fn advance(&self, ms: u64) {
        let target = self.clock.borrow().now_ms + ms;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let due = clock
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due_ms <= target)
                    .min_by_key(|(_, t)| (t.due_ms, t.id))
                    .map(|(i, _)| i);
                due.map(|i| {
                    let task = clock.tasks.remove(i);
                    clock.now_ms = task.due_ms;
                    task
                })
            };
            match next {
                // run outside the borrow; tasks may schedule again
                Some(task) => (task.task)(),
                None => break,
            }
        }
        self.clock.borrow_mut().now_ms = target;
    }

    pub(crate) fn pending(&self) -> usize {
        self.clock.borrow().tasks.len()
    }
}

impl TimerScheduler for ManualScheduler {
    type Handle = u64;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> u64 {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let id = clock.next_id;
        let due_ms = clock.now_ms + delay.as_millis() as u64;
        clock.tasks.push(ScheduledTask { id, due_ms, task });
        id
    }

    fn cancel(&self, handle: u64) {
        self.clock.borrow_mut().tasks.retain(|t| t.id != handle);
    }
}

type Reply = oneshot::Sender<Result<Vec<FinancialDataEntry>, AppError>>;

/// Repository whose responses are completed by the test, in any order.
#[derive(Clone, Default)]
pub(crate) struct ScriptedRepository {
    requests: Rc<RefCell<Vec<Symbol>>>,
    replies: Rc<RefCell<VecDeque<(Symbol, Reply)>>>,
}

impl ScriptedRepository {
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|s| s.value().to_string()).collect()
    }

    /// Complete the oldest outstanding request for `symbol`.
    pub(crate) fn respond(&self, symbol: &str, result: Result<Vec<FinancialDataEntry>, AppError>) {
        let mut replies = self.replies.borrow_mut();
        let pos = replies
            .iter()
            .position(|(s, _)| s.value() == symbol)
            .unwrap_or_else(|| panic!("no outstanding request for {symbol}"));
        let (_, reply) = replies.remove(pos).unwrap();
        let _ = reply.send(result);
    }
}

impl FinancialDataRepository for ScriptedRepository {
    fn fetch_financial_data(
        &self,
        symbol: &Symbol,
    ) -> LocalBoxFuture<'static, Result<Vec<FinancialDataEntry>, AppError>> {
        let (tx, rx) = oneshot::channel();
        self.requests.borrow_mut().push(symbol.clone());
        self.replies.borrow_mut().push_back((symbol.clone(), tx));
        async move {
            rx.await.unwrap_or_else(|_| Err(AppError::Network("request dropped".to_string())))
        }
        .boxed_local()
    }
}

pub(crate) fn entries(dates: &[&str]) -> Vec<FinancialDataEntry> {
    dates
        .iter()
        .enumerate()
        .map(|(i, d)| FinancialDataEntry::new(*d, 100.0 + i as f64, None, None))
        .collect()
}
