use futures::future::LocalBoxFuture;

use crate::domain::errors::AppError;
use crate::domain::market_data::{FinancialDataEntry, Symbol};

/// Source of daily price series keyed by symbol.
///
/// The returned future owns everything it needs so the controller can spawn
/// it on the event loop and drop its own borrow of the repository.
pub trait FinancialDataRepository {
    fn fetch_financial_data(
        &self,
        symbol: &Symbol,
    ) -> LocalBoxFuture<'static, Result<Vec<FinancialDataEntry>, AppError>>;
}
