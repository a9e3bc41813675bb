use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::market_data_model::{LatestQuotePair, Quote};
use super::market_data_traits::{
    MarketDataProviderTrait, MarketDataRepositoryTrait, MarketDataServiceTrait,
};
use crate::constants::MAX_QUOTE_PAD_DAYS;
use crate::errors::Result;
use crate::market_data::MarketDataError;

pub struct MarketDataService {
    repository: Arc<dyn MarketDataRepositoryTrait>,
    provider: Option<Arc<dyn MarketDataProviderTrait>>,
}

impl MarketDataService {
    pub fn new(
        repository: Arc<dyn MarketDataRepositoryTrait>,
        provider: Option<Arc<dyn MarketDataProviderTrait>>,
    ) -> Self {
        Self {
            repository,
            provider,
        }
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    fn get_price(&self, symbol: &str, date: NaiveDate) -> Option<Decimal> {
        let start = date - Duration::days(MAX_QUOTE_PAD_DAYS);
        let mut symbols = HashSet::new();
        symbols.insert(symbol.to_string());

        match self.repository.get_quotes_in_range(&symbols, start, date) {
            Ok(quotes) => quotes.last().map(|q| q.close),
            Err(e) => {
                warn!("Price lookup failed for {} on {}: {}", symbol, date, e);
                None
            }
        }
    }

    fn get_previous_trading_day_price(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Option<(NaiveDate, Decimal)> {
        let start = date - Duration::days(MAX_QUOTE_PAD_DAYS);
        let end = date - Duration::days(1);
        let mut symbols = HashSet::new();
        symbols.insert(symbol.to_string());

        match self.repository.get_quotes_in_range(&symbols, start, end) {
            Ok(quotes) => quotes.last().map(|q| (q.date, q.close)),
            Err(e) => {
                warn!(
                    "Previous close lookup failed for {} before {}: {}",
                    symbol, date, e
                );
                None
            }
        }
    }

    fn get_daily_quotes(
        &self,
        symbols: &HashSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<(String, NaiveDate), Quote>> {
        let quotes = self.repository.get_quotes_in_range(symbols, start, end)?;
        debug!(
            "Loaded {} quotes for {} symbols between {} and {}",
            quotes.len(),
            symbols.len(),
            start,
            end
        );

        Ok(quotes
            .into_iter()
            .map(|q| ((q.symbol.clone(), q.date), q))
            .collect())
    }

    fn trading_days(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        Ok(self.repository.distinct_quote_dates(start, end)?)
    }

    fn get_split_ratio(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> Decimal {
        match self.repository.get_splits_in_window(ticker, from, to) {
            Ok(events) => events
                .iter()
                .filter(|e| e.ratio > Decimal::ZERO)
                .fold(Decimal::ONE, |acc, e| acc * e.ratio),
            Err(e) => {
                warn!(
                    "Split lookup failed for {} between {} and {}: {}. Using 1.0.",
                    ticker, from, to, e
                );
                Decimal::ONE
            }
        }
    }

    fn get_latest_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        Ok(self.repository.get_latest_quote(symbol)?)
    }

    fn get_latest_quote_pair(&self, symbol: &str) -> Result<Option<LatestQuotePair>> {
        Ok(self.repository.get_latest_quote_pair(symbol)?)
    }

    fn upsert_quotes(&self, quotes: Vec<Quote>) -> Result<()> {
        Ok(self.repository.upsert_quotes(&quotes)?)
    }

    async fn sync_quotes(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(String, String)>> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            MarketDataError::ProviderError("No market data provider configured".to_string())
        })?;

        let fetches = symbols.iter().map(|symbol| {
            let provider = Arc::clone(provider);
            async move {
                let result = provider.fetch_quotes(symbol, start, end).await;
                (symbol.clone(), result)
            }
        });

        let mut failures = Vec::new();
        for (symbol, result) in join_all(fetches).await {
            match result {
                Ok(quotes) => {
                    if let Err(e) = self.repository.upsert_quotes(&quotes) {
                        failures.push((symbol, e.to_string()));
                    }
                }
                Err(e) => {
                    warn!("Quote sync failed for {}: {}", symbol, e);
                    failures.push((symbol, e.to_string()));
                }
            }
        }

        Ok(failures)
    }
}
