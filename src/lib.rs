use leptos::*;
use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::domain::logging::{LogComponent, get_logger, init_logger, init_time_provider};
use crate::infrastructure::{
    BrowserTimeProvider, ConsoleLogger, DashboardConfig, rendering::register_chart_components,
};

pub mod app;
pub mod application;
pub mod domain;
pub mod event_utils;
pub mod global_state;
pub mod infrastructure;
pub mod macros;
pub mod time_utils;

/// Process-wide setup: panic hook, logging, chart registration.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    init_logger(Box::new(ConsoleLogger::for_build()));
    init_time_provider(Box::new(BrowserTimeProvider::new()));
    register_chart_components();

    get_logger().info(LogComponent::Presentation("Initialize"), "ETF dashboard initialized");
}

/// Mount the dashboard into `<body>`.
#[wasm_bindgen]
pub fn mount_dashboard() -> Result<(), JsValue> {
    let config = DashboardConfig::from_environment()
        .map_err(|e| {
            get_logger().error(LogComponent::Presentation("Initialize"), &e.to_string());
            JsValue::from_str(&e.to_string())
        })?
        .with_document_overrides();

    mount_to_body(move || view! { <App config=config /> });
    Ok(())
}
