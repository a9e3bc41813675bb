use log::{debug, warn};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::{Arc, RwLock};

use super::returns_model::CashFlow;
use super::xirr;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::dividends::DividendRepositoryTrait;
use crate::errors::Result;
use crate::fx::FxServiceTrait;
use crate::market_data::MarketDataServiceTrait;
use crate::portfolio::accounting::position_accountant;
use crate::transactions::{Transaction, TransactionRepositoryTrait, TransactionSide};

pub trait ReturnsServiceTrait: Send + Sync {
    /// Annualized internal rate of return as a percentage, or `None` when
    /// the series has no root or the solver does not converge.
    fn solve_irr(&self, cash_flows: &[CashFlow]) -> Option<Decimal>;

    /// IRR of one ticker's full history: settlements out, proceeds and
    /// dividends in, the current position valued at the latest close as the
    /// terminal inflow.
    fn irr_for_ticker(&self, ticker: &str) -> Result<Option<Decimal>>;

    /// IRR of a closed position; `None` while any quantity is still held.
    fn irr_for_realized_position(&self, ticker: &str) -> Result<Option<Decimal>>;
}

pub struct ReturnsService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    dividend_repository: Arc<dyn DividendRepositoryTrait>,
    market_data_service: Arc<dyn MarketDataServiceTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    base_currency: Arc<RwLock<String>>,
}

impl ReturnsService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        dividend_repository: Arc<dyn DividendRepositoryTrait>,
        market_data_service: Arc<dyn MarketDataServiceTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
        base_currency: Arc<RwLock<String>>,
    ) -> Self {
        Self {
            transaction_repository,
            dividend_repository,
            market_data_service,
            fx_service,
            base_currency,
        }
    }

    /// Settlement and dividend flows of one ticker, in the base currency.
    fn ledger_cash_flows(&self, ticker: &str, transactions: &[Transaction]) -> Result<Vec<CashFlow>> {
        let base_currency = self.base_currency.read().unwrap().clone();
        let mut flows = Vec::new();

        for tx in transactions {
            let amount = match tx.side {
                TransactionSide::Buy => -tx.effective_cost(),
                TransactionSide::Sell => tx.effective_proceeds(),
            };
            flows.push(CashFlow::new(tx.transaction_date, amount));
        }

        for dividend in self.dividend_repository.get_by_ticker(ticker)? {
            let quantity = position_accountant::quantity_as_of(transactions, dividend.ex_date);
            if quantity <= Decimal::ZERO {
                continue;
            }
            let rate = self.fx_service.rate_or_unit(
                &dividend.currency,
                &base_currency,
                dividend.ex_date,
            );
            flows.push(CashFlow::new(
                dividend.ex_date,
                dividend.amount_per_share * quantity * rate,
            ));
        }

        Ok(flows)
    }
}

impl ReturnsServiceTrait for ReturnsService {
    fn solve_irr(&self, cash_flows: &[CashFlow]) -> Option<Decimal> {
        xirr::solve(cash_flows)
            .and_then(|rate| Decimal::from_f64(rate * 100.0))
            .map(|pct| pct.round_dp(DISPLAY_DECIMAL_PRECISION))
    }

    fn irr_for_ticker(&self, ticker: &str) -> Result<Option<Decimal>> {
        let transactions = self.transaction_repository.get_by_ticker(ticker)?;
        if transactions.is_empty() {
            return Ok(None);
        }

        let mut flows = self.ledger_cash_flows(ticker, &transactions)?;

        let outcome = position_accountant::replay(&transactions)?;
        if let Some(position) = outcome.position {
            // Terminal valuation at the latest close the store knows about;
            // a wall-clock date would make the result nondeterministic
            // against a fixed quote history.
            let quote = match self.market_data_service.get_latest_quote(ticker)? {
                Some(quote) => quote,
                None => {
                    warn!(
                        "No quote to value open position {}; IRR is undefined",
                        ticker
                    );
                    return Ok(None);
                }
            };
            let base_currency = self.base_currency.read().unwrap().clone();
            let rate = self
                .fx_service
                .rate_or_unit(&position.currency, &base_currency, quote.date);
            flows.push(CashFlow::new(
                quote.date,
                position.quantity * quote.close * rate,
            ));
        }

        debug!("IRR for {}: {} cash flows", ticker, flows.len());
        Ok(self.solve_irr(&flows))
    }

    fn irr_for_realized_position(&self, ticker: &str) -> Result<Option<Decimal>> {
        let transactions = self.transaction_repository.get_by_ticker(ticker)?;
        if transactions.is_empty() {
            return Ok(None);
        }

        let outcome = position_accountant::replay(&transactions)?;
        if outcome.position.is_some() {
            warn!(
                "{} still has an open position; realized IRR is undefined",
                ticker
            );
            return Ok(None);
        }

        let flows = self.ledger_cash_flows(ticker, &transactions)?;
        Ok(self.solve_irr(&flows))
    }
}
