use derive_more::Display;
use std::time::Duration;
use strum::{AsRefStr, EnumString};

use crate::domain::{
    errors::AppError,
    logging::{LogComponent, get_logger},
    market_data::Symbol,
};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Meta tag that overrides the compiled-in API URL at runtime.
pub const API_URL_META: &str = "dashboard-api-url";

/// How typing reaches the fetch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
pub enum InputMode {
    /// Settle the symbol after the input has been quiet for the debounce delay
    #[default]
    #[display(fmt = "debounce")]
    #[strum(serialize = "debounce")]
    Debounced,
    /// Only the Update button settles the symbol
    #[display(fmt = "explicit")]
    #[strum(serialize = "explicit")]
    ExplicitUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub default_symbol: Symbol,
    pub debounce: Duration,
    pub input_mode: InputMode,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            default_symbol: Symbol::default(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            input_mode: InputMode::Debounced,
        }
    }
}

impl DashboardConfig {
    /// Build from optional raw values; `None` keeps the default.
    pub fn from_values(
        api_url: Option<&str>,
        default_symbol: Option<&str>,
        debounce_ms: Option<&str>,
        input_mode: Option<&str>,
    ) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(url) = api_url {
            config.api_base_url = normalize_base_url(url)?;
        }
        if let Some(symbol) = default_symbol {
            config.default_symbol = Symbol::parse(symbol)
                .map_err(|e| AppError::Configuration(format!("DASHBOARD_DEFAULT_SYMBOL: {}", e)))?;
        }
        if let Some(raw) = debounce_ms {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                AppError::Configuration(format!("DASHBOARD_DEBOUNCE_MS is not a number: {}", raw))
            })?;
            if ms > MAX_DEBOUNCE_MS {
                return Err(AppError::Configuration(format!(
                    "DASHBOARD_DEBOUNCE_MS must be at most {}",
                    MAX_DEBOUNCE_MS
                )));
            }
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(mode) = input_mode {
            config.input_mode = mode.trim().to_lowercase().parse().map_err(|_| {
                AppError::Configuration(format!(
                    "DASHBOARD_INPUT_MODE must be 'debounce' or 'explicit', got {}",
                    mode
                ))
            })?;
        }

        Ok(config)
    }

    /// Values baked in at compile time.
    pub fn from_environment() -> Result<Self, AppError> {
        Self::from_values(
            option_env!("DASHBOARD_API_URL"),
            option_env!("DASHBOARD_DEFAULT_SYMBOL"),
            option_env!("DASHBOARD_DEBOUNCE_MS"),
            option_env!("DASHBOARD_INPUT_MODE"),
        )
    }

    /// Apply `<meta name="dashboard-api-url">` from the host page, if present.
    pub fn with_document_overrides(mut self) -> Self {
        let content = gloo::utils::document()
            .query_selector(&format!("meta[name=\"{}\"]", API_URL_META))
            .ok()
            .flatten()
            .and_then(|meta| meta.get_attribute("content"));

        if let Some(url) = content {
            match normalize_base_url(&url) {
                Ok(url) => self.api_base_url = url,
                Err(e) => get_logger().warn(
                    LogComponent::Infrastructure("Config"),
                    &format!("Ignoring {} meta tag: {}", API_URL_META, e),
                ),
            }
        }
        self
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce.as_millis() as u64
    }
}

fn normalize_base_url(raw: &str) -> Result<String, AppError> {
    let url = raw.trim().trim_end_matches('/');
    let host = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| AppError::Configuration(format!("API URL must be http(s): {}", raw)))?;
    if host.is_empty() {
        return Err(AppError::Configuration(format!("API URL has no host: {}", raw)));
    }
    Ok(url.to_string())
}
