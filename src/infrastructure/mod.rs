pub mod config;
pub mod http;
pub mod rendering;
pub mod services;

pub use config::{DashboardConfig, InputMode};
pub use http::DashboardApiClient;
pub use services::{BrowserTimeProvider, ConsoleLogger};
