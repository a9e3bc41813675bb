use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, NewExchangeRate};

pub type Result<T> = std::result::Result<T, FxError>;

/// Trait defining the contract for FX repository operations.
pub trait FxRepositoryTrait: Send + Sync {
    /// Most recent rate for the pair at or before `date`.
    fn get_rate_on_or_before(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>>;

    fn get_latest_rate(
        &self,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<Option<ExchangeRate>>;

    fn get_rates_in_range(
        &self,
        from_currency: &str,
        to_currency: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExchangeRate>>;

    fn save_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate>;

    fn delete_rate(&self, rate_id: &str) -> Result<()>;
}

/// Trait defining the contract for FX service operations.
pub trait FxServiceTrait: Send + Sync {
    fn get_rate_for_date(
        &self,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal>;

    fn get_latest_rate(&self, from_currency: &str, to_currency: &str) -> Result<Decimal>;

    fn convert_for_date(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
        date: NaiveDate,
    ) -> Result<Decimal>;

    /// Rate for the pair on `date`, degrading to `1.0` when the rate is
    /// unavailable or non-positive. A missing rate skews one contribution;
    /// aborting would lose the whole period.
    fn rate_or_unit(&self, from_currency: &str, to_currency: &str, date: NaiveDate) -> Decimal;

    fn add_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate>;
}
