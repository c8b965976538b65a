use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;

/// One-shot timer service. Dropping or cancelling a handle must prevent the
/// task from running.
pub trait TimerScheduler {
    type Handle;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Self::Handle;
    fn cancel(&self, handle: Self::Handle);
}

/// Browser timers via `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimerScheduler;

impl TimerScheduler for GlooTimerScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Timeout {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task)
    }

    fn cancel(&self, handle: Timeout) {
        // clears the browser timer
        drop(handle.cancel());
    }
}

/// Collapses bursts of values into the last one after a quiet period.
///
/// At most one timer is pending: every `schedule` cancels the previous one.
/// A generation counter guards against a timer that was already queued by the
/// event loop when it got cancelled.
pub struct Debouncer<T, S: TimerScheduler> {
    delay: Duration,
    scheduler: S,
    on_settle: Rc<dyn Fn(T)>,
    pending: Option<S::Handle>,
    generation: Rc<Cell<u64>>,
    settled_generation: Rc<Cell<u64>>,
}

impl<T: 'static, S: TimerScheduler> Debouncer<T, S> {
    pub fn new(delay: Duration, scheduler: S, on_settle: impl Fn(T) + 'static) -> Self {
        Self {
            delay,
            scheduler,
            on_settle: Rc::new(on_settle),
            pending: None,
            generation: Rc::new(Cell::new(0)),
            settled_generation: Rc::new(Cell::new(0)),
        }
    }

    /// Replace any pending value with `value` and restart the quiet period.
    pub fn schedule(&mut self, value: T) {
        self.cancel_pending();

        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let current = Rc::clone(&self.generation);
        let settled = Rc::clone(&self.settled_generation);
        let on_settle = Rc::clone(&self.on_settle);
        let handle = self.scheduler.schedule(
            self.delay,
            Box::new(move || {
                if current.get() == generation {
                    settled.set(generation);
                    on_settle(value);
                }
            }),
        );
        self.pending = Some(handle);
    }
}

impl<T, S: TimerScheduler> Debouncer<T, S> {
    /// Drop the pending value, if any. Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        let was_pending = self.is_pending();
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        self.generation.set(self.generation.get() + 1);
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some() && self.settled_generation.get() != self.generation.get()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T, S: TimerScheduler> Drop for Debouncer<T, S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::ManualScheduler;
    use std::cell::RefCell;

    fn recording_debouncer(
        scheduler: &ManualScheduler,
    ) -> (Debouncer<String, ManualScheduler>, Rc<RefCell<Vec<String>>>) {
        let settled = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&settled);
        let debouncer = Debouncer::new(Duration::from_millis(1000), scheduler.clone(), move |v| {
            sink.borrow_mut().push(v)
        });
        (debouncer, settled)
    }

    #[test]
    fn burst_settles_once_with_last_value() {
        let scheduler = ManualScheduler::default();
        let (mut debouncer, settled) = recording_debouncer(&scheduler);

        debouncer.schedule("Q".to_string());
        scheduler.advance(100);
        debouncer.schedule("QQ".to_string());
        scheduler.advance(100);
        debouncer.schedule("QQQ".to_string());
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(999);
        assert!(settled.borrow().is_empty());
        assert!(debouncer.is_pending());

        scheduler.advance(1);
        assert_eq!(*settled.borrow(), vec!["QQQ".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn spaced_values_settle_separately() {
        let scheduler = ManualScheduler::default();
        let (mut debouncer, settled) = recording_debouncer(&scheduler);

        debouncer.schedule("SPY".to_string());
        scheduler.advance(1500);
        debouncer.schedule("VOO".to_string());
        scheduler.advance(1500);

        assert_eq!(*settled.borrow(), vec!["SPY".to_string(), "VOO".to_string()]);
    }

    #[test]
    fn cancel_pending_drops_value() {
        let scheduler = ManualScheduler::default();
        let (mut debouncer, settled) = recording_debouncer(&scheduler);

        debouncer.schedule("IWM".to_string());
        assert!(debouncer.cancel_pending());
        assert!(!debouncer.cancel_pending());
        scheduler.advance(5000);

        assert!(settled.borrow().is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn drop_cancels_timer() {
        let scheduler = ManualScheduler::default();
        let (mut debouncer, settled) = recording_debouncer(&scheduler);
        debouncer.schedule("DIA".to_string());
        drop(debouncer);
        scheduler.advance(5000);
        assert!(settled.borrow().is_empty());
    }
}
