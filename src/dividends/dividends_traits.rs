use chrono::NaiveDate;

use super::dividends_model::{Dividend, DividendEvent, DividendIncomeSummary};
use crate::errors::Result;
use crate::market_data::ProviderDividend;

/// Trait defining the contract for dividend repository operations.
pub trait DividendRepositoryTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<Dividend>>;

    fn get_by_ticker(&self, ticker: &str) -> Result<Vec<Dividend>>;

    fn get_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Dividend>>;

    fn get_for_date(&self, ex_date: NaiveDate) -> Result<Vec<Dividend>>;

    fn upsert(&self, dividends: &[Dividend]) -> Result<()>;
}

/// Trait defining the contract for the dividend service.
pub trait DividendServiceTrait: Send + Sync {
    /// Dividend facts in the window joined with the replayed quantity held
    /// on each ex-date; zero-quantity events are dropped.
    fn dividend_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DividendEvent>>;

    /// Per-ticker income totals, normalized to the base currency with the
    /// ex-date rate.
    fn income_summary(&self) -> Result<Vec<DividendIncomeSummary>>;

    /// Persists provider output for a symbol.
    fn store_fetched(&self, ticker: &str, records: Vec<ProviderDividend>) -> Result<usize>;
}
