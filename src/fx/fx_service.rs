use chrono::NaiveDate;
use dashmap::DashMap;
use log::warn;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, NewExchangeRate};
use super::fx_traits::{FxRepositoryTrait, FxServiceTrait, Result};

/// Date-aware currency conversion backed by the stored rate facts.
///
/// Lookups pad backwards to the most recent rate at or before the requested
/// date and fall back to the inverse pair when only the opposite direction
/// was recorded.
#[derive(Clone)]
pub struct FxService {
    repository: Arc<dyn FxRepositoryTrait>,
    // (from, to, date) -> resolved rate; rebuilds are rare, rates are not.
    rate_cache: Arc<DashMap<(String, String, NaiveDate), Decimal>>,
}

impl FxService {
    pub fn new(repository: Arc<dyn FxRepositoryTrait>) -> Self {
        Self {
            repository,
            rate_cache: Arc::new(DashMap::new()),
        }
    }

    fn resolve_rate(&self, from: &str, to: &str, date: NaiveDate) -> Result<Decimal> {
        if let Some(rate) = self.repository.get_rate_on_or_before(from, to, date)? {
            return Ok(rate.rate);
        }

        // Inverse-pair fallback
        match self.repository.get_rate_on_or_before(to, from, date)? {
            Some(inverse) if !inverse.rate.is_zero() => Ok(Decimal::ONE / inverse.rate),
            _ => Err(FxError::RateNotFound(format!(
                "{}->{} on {}",
                from, to, date
            ))),
        }
    }
}

impl FxServiceTrait for FxService {
    fn get_rate_for_date(&self, from: &str, to: &str, date: NaiveDate) -> Result<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let key = (from.to_string(), to.to_string(), date);
        if let Some(cached) = self.rate_cache.get(&key) {
            return Ok(*cached);
        }

        let rate = self.resolve_rate(from, to, date)?;
        self.rate_cache.insert(key, rate);
        Ok(rate)
    }

    fn get_latest_rate(&self, from: &str, to: &str) -> Result<Decimal> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        if let Some(rate) = self.repository.get_latest_rate(from, to)? {
            return Ok(rate.rate);
        }
        match self.repository.get_latest_rate(to, from)? {
            Some(inverse) if !inverse.rate.is_zero() => Ok(Decimal::ONE / inverse.rate),
            _ => Err(FxError::RateNotFound(format!("{}->{}", from, to))),
        }
    }

    fn convert_for_date(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Decimal> {
        let rate = self.get_rate_for_date(from, to, date)?;
        Ok(amount * rate)
    }

    fn rate_or_unit(&self, from: &str, to: &str, date: NaiveDate) -> Decimal {
        match self.get_rate_for_date(from, to, date) {
            Ok(rate) if rate > Decimal::ZERO => rate,
            Ok(rate) => {
                warn!(
                    "Non-positive FX rate {} for {}->{} on {}. Using 1.0.",
                    rate, from, to, date
                );
                Decimal::ONE
            }
            Err(e) => {
                warn!("FX rate unavailable for {}->{} on {}: {}. Using 1.0.", from, to, date, e);
                Decimal::ONE
            }
        }
    }

    fn add_rate(&self, new_rate: NewExchangeRate) -> Result<ExchangeRate> {
        if new_rate.from_currency.trim().is_empty() || new_rate.to_currency.trim().is_empty() {
            return Err(FxError::InvalidCurrencyPair(format!(
                "'{}'/'{}'",
                new_rate.from_currency, new_rate.to_currency
            )));
        }
        if new_rate.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate(new_rate.rate.to_string()));
        }

        let rate = ExchangeRate::from(new_rate);
        self.rate_cache.remove(&(
            rate.from_currency.clone(),
            rate.to_currency.clone(),
            rate.rate_date,
        ));
        self.repository.save_rate(rate)
    }
}
