use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::dividends_model::{Dividend, DividendEvent, DividendIncomeSummary};
use super::dividends_traits::{DividendRepositoryTrait, DividendServiceTrait};
use crate::errors::Result;
use crate::fx::FxServiceTrait;
use crate::market_data::ProviderDividend;
use crate::portfolio::accounting::position_accountant;
use crate::transactions::{Transaction, TransactionRepositoryTrait};

pub struct DividendService {
    repository: Arc<dyn DividendRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    base_currency: Arc<RwLock<String>>,
}

impl DividendService {
    pub fn new(
        repository: Arc<dyn DividendRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
        base_currency: Arc<RwLock<String>>,
    ) -> Self {
        Self {
            repository,
            transaction_repository,
            fx_service,
            base_currency,
        }
    }

    fn transactions_by_ticker(&self) -> Result<HashMap<String, Vec<Transaction>>> {
        let mut grouped: HashMap<String, Vec<Transaction>> = HashMap::new();
        for tx in self.transaction_repository.get_all()? {
            grouped.entry(tx.ticker.clone()).or_default().push(tx);
        }
        Ok(grouped)
    }

    fn to_events(
        &self,
        dividends: Vec<Dividend>,
        ledger: &HashMap<String, Vec<Transaction>>,
    ) -> Vec<DividendEvent> {
        dividends
            .into_iter()
            .filter_map(|dividend| {
                let transactions = ledger.get(&dividend.ticker)?;
                let quantity =
                    position_accountant::quantity_as_of(transactions, dividend.ex_date);
                if quantity <= Decimal::ZERO {
                    return None;
                }
                Some(DividendEvent {
                    total_amount: dividend.amount_per_share * quantity,
                    ticker: dividend.ticker,
                    ex_date: dividend.ex_date,
                    amount_per_share: dividend.amount_per_share,
                    currency: dividend.currency,
                    quantity_held_at_ex_date: quantity,
                })
            })
            .collect()
    }
}

impl DividendServiceTrait for DividendService {
    fn dividend_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DividendEvent>> {
        let dividends = self.repository.get_in_range(start, end)?;
        let ledger = self.transactions_by_ticker()?;
        Ok(self.to_events(dividends, &ledger))
    }

    fn income_summary(&self) -> Result<Vec<DividendIncomeSummary>> {
        let base_currency = self.base_currency.read().unwrap().clone();
        let dividends = self.repository.get_all()?;
        let ledger = self.transactions_by_ticker()?;
        let events = self.to_events(dividends, &ledger);

        let mut summaries: HashMap<String, DividendIncomeSummary> = HashMap::new();
        for event in events {
            let amount_base = event.total_amount
                * self
                    .fx_service
                    .rate_or_unit(&event.currency, &base_currency, event.ex_date);

            let entry = summaries
                .entry(event.ticker.clone())
                .or_insert_with(|| DividendIncomeSummary {
                    ticker: event.ticker.clone(),
                    currency: event.currency.clone(),
                    event_count: 0,
                    total_amount: Decimal::ZERO,
                    total_amount_base: Decimal::ZERO,
                });
            entry.event_count += 1;
            entry.total_amount += event.total_amount;
            entry.total_amount_base += amount_base;
        }

        let mut result: Vec<DividendIncomeSummary> = summaries.into_values().collect();
        result.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(result)
    }

    fn store_fetched(&self, ticker: &str, records: Vec<ProviderDividend>) -> Result<usize> {
        let dividends: Vec<Dividend> = records
            .into_iter()
            .filter(|r| r.amount_per_share > Decimal::ZERO)
            .map(|r| Dividend::new(ticker, r.ex_date, r.amount_per_share, &r.currency))
            .collect();

        self.repository.upsert(&dividends)?;
        debug!("Stored {} dividends for {}", dividends.len(), ticker);
        Ok(dividends.len())
    }
}
