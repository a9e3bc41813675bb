use chrono::NaiveDate;

use super::transactions_model::{ImportOutcome, NewTransaction, Transaction};
use super::transactions_errors::Result;

/// Trait defining the contract for ledger repository operations.
///
/// Every read returns entries ordered by `(transaction_date, sequence)` so
/// replay determinism is a property of the boundary, not of the caller.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<Transaction>>;

    fn get_by_ticker(&self, ticker: &str) -> Result<Vec<Transaction>>;

    fn get_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>>;

    fn insert(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Deletes the entries and returns the distinct tickers they belonged
    /// to, so the caller can rebuild the derived state per ticker.
    fn delete(&self, ids: &[String]) -> Result<Vec<String>>;

    fn exists_duplicate(
        &self,
        transaction_date: NaiveDate,
        ticker: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<bool>;

    fn distinct_tickers(&self) -> Result<Vec<String>>;

    fn first_transaction_date(&self) -> Result<Option<NaiveDate>>;
}

/// Trait defining the contract for the ledger service.
pub trait TransactionServiceTrait: Send + Sync {
    /// Validates and stores a batch, then rebuilds the derived state of the
    /// affected tickers. Row failures are collected, not fatal.
    fn save_transactions(&self, entries: Vec<NewTransaction>) -> crate::errors::Result<ImportOutcome>;

    fn get_transactions(&self) -> crate::errors::Result<Vec<Transaction>>;

    fn get_transactions_for_ticker(&self, ticker: &str) -> crate::errors::Result<Vec<Transaction>>;

    /// Deletes entries and rebuilds the affected tickers.
    fn delete_transactions(&self, ids: &[String]) -> crate::errors::Result<Vec<String>>;

    fn check_duplicate(
        &self,
        transaction_date: NaiveDate,
        ticker: &str,
        quantity: f64,
        unit_price: f64,
    ) -> crate::errors::Result<bool>;
}
