use futures::future::{FutureExt, LocalBoxFuture};
use gloo_net::http::Request;

use crate::domain::{
    errors::{AppError, NetworkResult},
    logging::{LogComponent, get_logger},
    market_data::{FinancialDataEntry, FinancialDataRepository, Symbol},
};
use crate::infrastructure::config::DashboardConfig;
use crate::log_debug;

/// HTTP client for the dashboard backend (`GET /data/{symbol}/`)
#[derive(Debug, Clone)]
pub struct DashboardApiClient {
    base_url: String,
}

impl DashboardApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn data_url(&self, symbol: &Symbol) -> String {
        format!("{}/data/{}/", self.base_url, symbol.value())
    }

    /// Fetch the full ordered series for `symbol`.
    pub async fn get_entries(&self, symbol: &Symbol) -> NetworkResult<Vec<FinancialDataEntry>> {
        let url = self.data_url(symbol);
        log_debug!(LogComponent::Infrastructure("DashboardApi"), "GET {}", url);

        let response = Request::get(&url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to send request: {}", e)))?;

        if !response.ok() {
            return Err(AppError::Http {
                status: response.status(),
                status_text: response.status_text(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))?;
        let entries = parse_entries(&body)?;

        get_logger().info(
            LogComponent::Infrastructure("DashboardApi"),
            &format!("Fetched {} entries for {}", entries.len(), symbol),
        );
        Ok(entries)
    }
}

/// Decode a `/data/{symbol}/` body. Anything but a JSON array of objects is
/// a parse error.
pub fn parse_entries(body: &str) -> Result<Vec<FinancialDataEntry>, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::Parse(format!("Invalid entry list: {}", e)))
}

impl FinancialDataRepository for DashboardApiClient {
    fn fetch_financial_data(
        &self,
        symbol: &Symbol,
    ) -> LocalBoxFuture<'static, Result<Vec<FinancialDataEntry>, AppError>> {
        let client = self.clone();
        let symbol = symbol.clone();
        async move { client.get_entries(&symbol).await }.boxed_local()
    }
}
