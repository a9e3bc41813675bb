use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use super::market_data_errors::MarketDataError;
use super::market_data_model::{
    LatestQuotePair, ProviderDividend, ProviderSplit, Quote, SplitEvent,
};
use crate::errors::Result;

pub type RepositoryResult<T> = std::result::Result<T, MarketDataError>;

pub trait MarketDataRepositoryTrait: Send + Sync {
    fn get_quote(&self, symbol: &str, date: NaiveDate) -> RepositoryResult<Option<Quote>>;

    fn get_quotes_in_range(
        &self,
        symbols: &HashSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Quote>>;

    fn get_latest_quote(&self, symbol: &str) -> RepositoryResult<Option<Quote>>;

    fn get_latest_quote_pair(&self, symbol: &str) -> RepositoryResult<Option<LatestQuotePair>>;

    /// Distinct quote dates across all symbols — the engine's trading-day
    /// calendar.
    fn distinct_quote_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<NaiveDate>>;

    fn upsert_quotes(&self, quotes: &[Quote]) -> RepositoryResult<()>;

    /// Split events with `from < split_date <= to`.
    fn get_splits_in_window(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<SplitEvent>>;

    fn upsert_splits(&self, splits: &[SplitEvent]) -> RepositoryResult<()>;
}

/// External quote/dividend/split source. Implementations live with the host
/// application; the engine only consumes the contract and treats every
/// failure as data being unavailable for that symbol and range.
#[async_trait]
pub trait MarketDataProviderTrait: Send + Sync {
    async fn fetch_quotes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Quote>>;

    async fn fetch_dividends(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ProviderDividend>>;

    async fn fetch_splits(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ProviderSplit>>;
}

#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Closing price on `date`, padding back to the last available close.
    /// `None` when the symbol has no usable quote near that date.
    fn get_price(&self, symbol: &str, date: NaiveDate) -> Option<Decimal>;

    /// Close of the trading day preceding `date` for the symbol.
    fn get_previous_trading_day_price(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Option<(NaiveDate, Decimal)>;

    fn get_daily_quotes(
        &self,
        symbols: &HashSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<(String, NaiveDate), Quote>>;

    fn trading_days(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>>;

    /// Cumulative split multiplier for `(from, to]`; `1.0` when no split
    /// occurred or the window could not be read.
    fn get_split_ratio(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> Decimal;

    fn get_latest_quote(&self, symbol: &str) -> Result<Option<Quote>>;

    fn get_latest_quote_pair(&self, symbol: &str) -> Result<Option<LatestQuotePair>>;

    fn upsert_quotes(&self, quotes: Vec<Quote>) -> Result<()>;

    /// Pulls quotes for the symbols from the configured provider and stores
    /// them. Returns `(symbol, error)` pairs for the symbols that failed;
    /// one symbol's failure never aborts the sweep.
    async fn sync_quotes(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(String, String)>>;
}
