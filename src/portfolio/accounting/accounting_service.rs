use log::{debug, error, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, RwLock};

use super::accounting_model::{
    Position, PositionValuation, RealizedGain, RealizedGainSummary, ReplayOutcome,
};
use super::accounting_traits::{AccountingServiceTrait, PositionRepositoryTrait};
use super::position_accountant;
use crate::errors::Result;
use crate::fx::FxServiceTrait;
use crate::market_data::MarketDataServiceTrait;
use crate::transactions::TransactionRepositoryTrait;

/// Drives the pure accountant against the stores.
///
/// The persisted position/realized-gain rows are a materialized view of the
/// ledger; after any edit the affected ticker is regenerated wholesale
/// rather than patched.
pub struct AccountingService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    position_repository: Arc<dyn PositionRepositoryTrait>,
    market_data_service: Arc<dyn MarketDataServiceTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    base_currency: Arc<RwLock<String>>,
}

impl AccountingService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        position_repository: Arc<dyn PositionRepositoryTrait>,
        market_data_service: Arc<dyn MarketDataServiceTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
        base_currency: Arc<RwLock<String>>,
    ) -> Self {
        Self {
            transaction_repository,
            position_repository,
            market_data_service,
            fx_service,
            base_currency,
        }
    }

    fn valuation_for(&self, position: Position) -> PositionValuation {
        let base_currency = self.base_currency.read().unwrap().clone();

        let quote_pair = match self.market_data_service.get_latest_quote_pair(&position.ticker) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(
                    "No quotes available for held position {}: {}",
                    position.ticker, e
                );
                None
            }
        };

        let mut valuation = PositionValuation {
            ticker: position.ticker,
            security_name: position.security_name,
            quantity: position.quantity,
            average_cost: position.average_cost,
            total_cost: position.total_cost,
            currency: position.currency,
            current_price: None,
            previous_close: None,
            day_change_pct: None,
            market_value: None,
            unrealized_pnl: None,
            unrealized_pnl_pct: None,
            market_value_base: None,
        };

        let pair = match quote_pair {
            Some(pair) => pair,
            None => return valuation,
        };

        let current_price = pair.latest.close;
        valuation.current_price = Some(current_price);
        valuation.previous_close = pair.previous.as_ref().map(|q| q.close);

        if let Some(previous) = pair.previous {
            if previous.close > Decimal::ZERO {
                valuation.day_change_pct =
                    Some((current_price - previous.close) / previous.close * dec!(100));
            }
        }

        let market_value = valuation.quantity * current_price;
        valuation.market_value = Some(market_value);
        let unrealized = market_value - valuation.total_cost;
        valuation.unrealized_pnl = Some(unrealized);
        if valuation.total_cost > Decimal::ZERO {
            valuation.unrealized_pnl_pct = Some(unrealized / valuation.total_cost * dec!(100));
        }

        let rate = self
            .fx_service
            .rate_or_unit(&valuation.currency, &base_currency, pair.latest.date);
        valuation.market_value_base = Some(market_value * rate);

        valuation
    }
}

impl AccountingServiceTrait for AccountingService {
    fn replay(&self, ticker: &str) -> Result<ReplayOutcome> {
        let transactions = self.transaction_repository.get_by_ticker(ticker)?;
        Ok(position_accountant::replay(&transactions)?)
    }

    fn rebuild(&self, ticker: &str) -> Result<()> {
        let outcome = self.replay(ticker)?;
        self.position_repository.replace_derived_state(
            ticker,
            outcome.position.as_ref(),
            &outcome.realized_gains,
        )?;
        debug!(
            "Rebuilt {}: position {}, {} realized gains",
            ticker,
            if outcome.position.is_some() { "open" } else { "flat" },
            outcome.realized_gains.len()
        );
        Ok(())
    }

    fn rebuild_all(&self) -> Result<Vec<(String, String)>> {
        let tickers = self.transaction_repository.distinct_tickers()?;
        let mut failures = Vec::new();

        for ticker in tickers {
            if let Err(e) = self.rebuild(&ticker) {
                error!("Rebuild failed for {}: {}", ticker, e);
                failures.push((ticker, e.to_string()));
            }
        }

        Ok(failures)
    }

    fn get_positions(&self) -> Result<Vec<Position>> {
        Ok(self.position_repository.get_positions()?)
    }

    fn get_position(&self, ticker: &str) -> Result<Option<Position>> {
        Ok(self.position_repository.get_position(ticker)?)
    }

    fn get_realized_gains_for_ticker(&self, ticker: &str) -> Result<Vec<RealizedGain>> {
        Ok(self.position_repository.get_realized_gains_for_ticker(ticker)?)
    }

    fn realized_gain_summary(&self) -> Result<Vec<RealizedGainSummary>> {
        let gains = self.position_repository.get_realized_gains()?;

        let mut summaries: Vec<RealizedGainSummary> = Vec::new();
        for gain in gains {
            match summaries.iter_mut().find(|s| s.ticker == gain.ticker) {
                Some(summary) => {
                    summary.sell_count += 1;
                    summary.total_quantity += gain.quantity;
                    summary.total_realized_pnl += gain.realized_pnl;
                }
                None => summaries.push(RealizedGainSummary {
                    ticker: gain.ticker,
                    currency: gain.currency,
                    sell_count: 1,
                    total_quantity: gain.quantity,
                    total_realized_pnl: gain.realized_pnl,
                }),
            }
        }

        summaries.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(summaries)
    }

    fn get_holdings_overview(&self) -> Result<Vec<PositionValuation>> {
        let positions = self.position_repository.get_positions()?;
        Ok(positions
            .into_iter()
            .filter(|p| !p.quantity.is_zero())
            .map(|p| self.valuation_for(p))
            .collect())
    }
}
