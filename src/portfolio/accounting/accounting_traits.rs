use chrono::NaiveDate;

use super::accounting_errors::AccountingError;
use super::accounting_model::{
    Position, PositionValuation, RealizedGain, RealizedGainSummary, ReplayOutcome,
};

pub type RepositoryResult<T> = std::result::Result<T, AccountingError>;

/// Trait defining the contract for the derived-state store
/// (positions + realized gains).
pub trait PositionRepositoryTrait: Send + Sync {
    fn get_positions(&self) -> RepositoryResult<Vec<Position>>;

    fn get_position(&self, ticker: &str) -> RepositoryResult<Option<Position>>;

    fn get_realized_gains(&self) -> RepositoryResult<Vec<RealizedGain>>;

    fn get_realized_gains_for_ticker(&self, ticker: &str) -> RepositoryResult<Vec<RealizedGain>>;

    fn get_realized_gains_for_date(&self, sell_date: NaiveDate)
        -> RepositoryResult<Vec<RealizedGain>>;

    fn get_realized_gains_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RealizedGain>>;

    /// Replaces the ticker's position and realized-gain rows in one
    /// database transaction. Readers never observe a half-rebuilt ticker.
    fn replace_derived_state(
        &self,
        ticker: &str,
        position: Option<&Position>,
        realized_gains: &[RealizedGain],
    ) -> RepositoryResult<()>;
}

/// Trait defining the contract for the position-accounting service.
pub trait AccountingServiceTrait: Send + Sync {
    /// Derives the ticker's state from the ledger without persisting it.
    fn replay(&self, ticker: &str) -> crate::errors::Result<ReplayOutcome>;

    /// Discards and regenerates the ticker's derived state atomically.
    fn rebuild(&self, ticker: &str) -> crate::errors::Result<()>;

    /// Rebuilds every ticker in the ledger. Failures are isolated per
    /// ticker and returned as `(ticker, error)` pairs.
    fn rebuild_all(&self) -> crate::errors::Result<Vec<(String, String)>>;

    fn get_positions(&self) -> crate::errors::Result<Vec<Position>>;

    fn get_position(&self, ticker: &str) -> crate::errors::Result<Option<Position>>;

    fn get_realized_gains_for_ticker(
        &self,
        ticker: &str,
    ) -> crate::errors::Result<Vec<RealizedGain>>;

    fn realized_gain_summary(&self) -> crate::errors::Result<Vec<RealizedGainSummary>>;

    /// Positions joined with their latest quotes and FX for presentation.
    fn get_holdings_overview(&self) -> crate::errors::Result<Vec<PositionValuation>>;
}
