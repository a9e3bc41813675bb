use log::{debug, warn};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use super::transactions_errors::TransactionError;
use super::transactions_model::{
    ImportError, ImportOutcome, NewTransaction, Transaction, TransactionSide,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::errors::Result;
use crate::portfolio::accounting::AccountingServiceTrait;

/// Ledger ingestion and correction front door.
///
/// Rows are validated and duplicate-checked before they touch the store;
/// SELL rows are additionally checked against the replayed holding so an
/// oversell is rejected rather than poisoning the derived state. After a
/// batch, the affected tickers are rebuilt wholesale.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    accounting_service: Arc<dyn AccountingServiceTrait>,
}

impl TransactionService {
    pub fn new(
        repository: Arc<dyn TransactionRepositoryTrait>,
        accounting_service: Arc<dyn AccountingServiceTrait>,
    ) -> Self {
        Self {
            repository,
            accounting_service,
        }
    }

    fn check_entry(&self, entry: &NewTransaction) -> std::result::Result<(), TransactionError> {
        entry.validate()?;
        let date = entry.parsed_date()?;

        if self
            .repository
            .exists_duplicate(date, &entry.ticker, entry.quantity, entry.unit_price)?
        {
            return Err(TransactionError::Duplicate(format!(
                "{} {} x {} @ {} already recorded",
                entry.transaction_date, entry.ticker, entry.quantity, entry.unit_price
            )));
        }

        if TransactionSide::from_str(&entry.side) == Ok(TransactionSide::Sell) {
            let held = self
                .accounting_service
                .replay(&entry.ticker)
                .map_err(|e| TransactionError::InvalidData(e.to_string()))?
                .position
                .map(|p| p.quantity)
                .unwrap_or(Decimal::ZERO);

            let requested = Decimal::from_f64(entry.quantity).unwrap_or_default();
            if requested > held {
                return Err(TransactionError::InvalidData(format!(
                    "SELL of {} {} exceeds held quantity {}",
                    requested, entry.ticker, held
                )));
            }
        }

        Ok(())
    }
}

impl TransactionServiceTrait for TransactionService {
    fn save_transactions(&self, entries: Vec<NewTransaction>) -> Result<ImportOutcome> {
        let mut outcome = ImportOutcome::default();
        let mut affected: BTreeSet<String> = BTreeSet::new();

        for entry in entries {
            let checked = self
                .check_entry(&entry)
                .and_then(|_| self.repository.insert(entry.clone()));

            match checked {
                Ok(transaction) => {
                    affected.insert(transaction.ticker);
                    outcome.saved += 1;
                }
                Err(e) => {
                    warn!(
                        "Rejected transaction {} {}: {}",
                        entry.transaction_date, entry.ticker, e
                    );
                    outcome.failed += 1;
                    outcome.errors.push(ImportError {
                        ticker: entry.ticker,
                        transaction_date: entry.transaction_date,
                        message: e.to_string(),
                    });
                }
            }
        }

        for ticker in &affected {
            self.accounting_service.rebuild(ticker)?;
        }
        debug!(
            "Imported {} transactions ({} rejected), rebuilt {} tickers",
            outcome.saved,
            outcome.failed,
            affected.len()
        );

        Ok(outcome)
    }

    fn get_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.repository.get_all()?)
    }

    fn get_transactions_for_ticker(&self, ticker: &str) -> Result<Vec<Transaction>> {
        Ok(self.repository.get_by_ticker(ticker)?)
    }

    fn delete_transactions(&self, ids: &[String]) -> Result<Vec<String>> {
        let affected = self.repository.delete(ids)?;
        for ticker in &affected {
            self.accounting_service.rebuild(ticker)?;
        }
        Ok(affected)
    }

    fn check_duplicate(
        &self,
        transaction_date: chrono::NaiveDate,
        ticker: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<bool> {
        Ok(self
            .repository
            .exists_duplicate(transaction_date, ticker, quantity, unit_price)?)
    }
}
