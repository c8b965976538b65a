use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::value_objects::Symbol;

/// Domain entity - one daily observation as served by `/data/{symbol}/`
///
/// A missing or `null` close becomes NaN so the chart draws a gap instead of
/// rejecting the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialDataEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default = "missing_price", deserialize_with = "nullable_price")]
    pub close_price: f64,
    #[serde(default)]
    pub sma_20: Option<f64>,
    #[serde(default)]
    pub sma_50: Option<f64>,
}

fn missing_price() -> f64 {
    f64::NAN
}

fn nullable_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl FinancialDataEntry {
    pub fn new(date: impl Into<String>, close_price: f64, sma_20: Option<f64>, sma_50: Option<f64>) -> Self {
        Self { date: date.into(), close_price, sma_20, sma_50 }
    }

    /// Close price, `None` when absent or not finite.
    pub fn close(&self) -> Option<f64> {
        Some(self.close_price).filter(|v| v.is_finite())
    }

    pub fn sma_20(&self) -> Option<f64> {
        self.sma_20.filter(|v| v.is_finite())
    }

    pub fn sma_50(&self) -> Option<f64> {
        self.sma_50.filter(|v| v.is_finite())
    }
}

/// Domain entity - immutable result of one successful fetch
///
/// Entries are kept in source order; nothing re-sorts them. `revision` is the
/// id of the request that produced the series, so two fetches of the same
/// symbol are still distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSeries {
    symbol: Symbol,
    entries: Arc<Vec<FinancialDataEntry>>,
    revision: u64,
}

impl FinancialSeries {
    pub fn new(symbol: Symbol, entries: Vec<FinancialDataEntry>, revision: u64) -> Self {
        Self { symbol, entries: Arc::new(entries), revision }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn entries(&self) -> &[FinancialDataEntry] {
        &self.entries
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&FinancialDataEntry> {
        self.entries.last()
    }
}
