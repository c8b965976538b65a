#![cfg(target_arch = "wasm32")]
use etf_dashboard_wasm::application::{Debouncer, GlooTimerScheduler};
use gloo_timers::future::TimeoutFuture;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn browser_timer_settles_last_value_once() {
    let settled = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&settled);
    let mut debouncer = Debouncer::new(Duration::from_millis(50), GlooTimerScheduler, move |v: String| {
        sink.borrow_mut().push(v)
    });

    debouncer.schedule("Q".into());
    TimeoutFuture::new(10).await;
    debouncer.schedule("QQ".into());
    TimeoutFuture::new(10).await;
    debouncer.schedule("QQQ".into());

    TimeoutFuture::new(120).await;
    assert_eq!(*settled.borrow(), vec!["QQQ".to_string()]);
    assert!(!debouncer.is_pending());
}

#[wasm_bindgen_test]
async fn cancelled_browser_timer_never_fires() {
    let fired = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&fired);
    let mut debouncer =
        Debouncer::new(Duration::from_millis(20), GlooTimerScheduler, move |_: String| *flag.borrow_mut() = true);

    debouncer.schedule("SPY".into());
    assert!(debouncer.cancel_pending());
    TimeoutFuture::new(60).await;
    assert!(!*fired.borrow());
}
