use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::errors::AppError;

/// Value Object - ETF ticker
///
/// Always uppercase, non-empty and limited to `[A-Z0-9.-]`, so it can be
/// spliced into a URL path without encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize, Deserialize)]
#[display(fmt = "{}", _0)]
pub struct Symbol(String);

impl Symbol {
    pub const MAX_LEN: usize = 12;
    pub const DEFAULT: &'static str = "SPY";

    pub fn parse(input: &str) -> Result<Self, AppError> {
        let value = input.trim().to_uppercase();
        if value.is_empty() {
            return Err(AppError::Validation("Symbol cannot be empty".to_string()));
        }
        if value.chars().count() > Self::MAX_LEN {
            return Err(AppError::Validation(format!(
                "Symbol {} is longer than {} characters",
                value,
                Self::MAX_LEN
            )));
        }
        if let Some(bad) = value.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
        {
            return Err(AppError::Validation(format!(
                "Symbol {} contains unsupported character '{}'",
                value, bad
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// The ticker the dashboard opens with.
impl Default for Symbol {
    fn default() -> Self {
        Self(Symbol::DEFAULT.to_string())
    }
}

impl FromStr for Symbol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
