//! In-memory fixtures and mock collaborators shared by the portfolio tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Mutex, RwLock};

use crate::benchmarks::{BenchmarkQuote, BenchmarkRepositoryTrait};
use crate::dividends::{Dividend, DividendRepositoryTrait};
use crate::errors::Result;
use crate::fx::{FxError, FxServiceTrait};
use crate::fx::fx_model::{ExchangeRate, NewExchangeRate};
use crate::market_data::{
    DataSource, LatestQuotePair, MarketDataServiceTrait, Quote, SplitEvent,
};
use crate::portfolio::accounting::accounting_traits::{
    PositionRepositoryTrait, RepositoryResult,
};
use crate::portfolio::accounting::{AccountingError, Position, RealizedGain};
use crate::transactions::{
    NewTransaction, Transaction, TransactionRepositoryTrait, TransactionSide,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_transaction(
    id: &str,
    ticker: &str,
    side: TransactionSide,
    date_str: &str,
    quantity: Decimal,
    unit_price: Decimal,
    commission: Decimal,
    settlement_amount: Option<Decimal>,
    currency: &str,
    sequence: i64,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        ticker: ticker.to_string(),
        security_name: None,
        side,
        transaction_date: NaiveDate::from_str(date_str).unwrap(),
        quantity,
        unit_price,
        commission,
        settlement_amount,
        trade_currency: currency.to_string(),
        sequence,
        created_at: Utc::now().naive_utc(),
    }
}

pub fn make_quote(symbol: &str, date: NaiveDate, close: Decimal, currency: &str) -> Quote {
    Quote::new(symbol, date, close, currency, DataSource::Manual)
}

pub fn make_dividend(
    ticker: &str,
    ex_date: NaiveDate,
    amount_per_share: Decimal,
    currency: &str,
) -> Dividend {
    Dividend::new(ticker, ex_date, amount_per_share, currency)
}

// --- Mock ledger repository ---

pub struct MockTransactionRepository {
    pub transactions: RwLock<Vec<Transaction>>,
}

impl MockTransactionRepository {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: RwLock::new(transactions),
        }
    }

    fn sorted(mut rows: Vec<Transaction>) -> Vec<Transaction> {
        rows.sort_by_key(|t| (t.transaction_date, t.sequence));
        rows
    }
}

impl TransactionRepositoryTrait for MockTransactionRepository {
    fn get_all(&self) -> crate::transactions::Result<Vec<Transaction>> {
        Ok(Self::sorted(self.transactions.read().unwrap().clone()))
    }

    fn get_by_ticker(&self, ticker: &str) -> crate::transactions::Result<Vec<Transaction>> {
        Ok(Self::sorted(
            self.transactions
                .read()
                .unwrap()
                .iter()
                .filter(|t| t.ticker == ticker)
                .cloned()
                .collect(),
        ))
    }

    fn get_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> crate::transactions::Result<Vec<Transaction>> {
        Ok(Self::sorted(
            self.transactions
                .read()
                .unwrap()
                .iter()
                .filter(|t| t.transaction_date >= start && t.transaction_date <= end)
                .cloned()
                .collect(),
        ))
    }

    fn insert(&self, new: NewTransaction) -> crate::transactions::Result<Transaction> {
        new.validate()?;
        let transaction_date = new.parsed_date()?;

        let mut rows = self.transactions.write().unwrap();
        let sequence = rows.iter().map(|t| t.sequence).max().unwrap_or(0) + 1;
        let transaction = Transaction {
            id: new.id.unwrap_or_else(|| format!("tx{}", sequence)),
            ticker: new.ticker,
            security_name: new.security_name,
            side: TransactionSide::from_str(&new.side).unwrap(),
            transaction_date,
            quantity: Decimal::try_from(new.quantity).unwrap_or_default(),
            unit_price: Decimal::try_from(new.unit_price).unwrap_or_default(),
            commission: Decimal::try_from(new.commission).unwrap_or_default(),
            settlement_amount: new
                .settlement_amount
                .and_then(|s| Decimal::try_from(s).ok()),
            trade_currency: new.trade_currency,
            sequence,
            created_at: Utc::now().naive_utc(),
        };
        rows.push(transaction.clone());
        Ok(transaction)
    }

    fn delete(&self, ids: &[String]) -> crate::transactions::Result<Vec<String>> {
        let mut rows = self.transactions.write().unwrap();
        let mut affected: Vec<String> = rows
            .iter()
            .filter(|t| ids.contains(&t.id))
            .map(|t| t.ticker.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        affected.sort();
        rows.retain(|t| !ids.contains(&t.id));
        Ok(affected)
    }

    fn exists_duplicate(
        &self,
        date: NaiveDate,
        ticker: &str,
        quantity: f64,
        unit_price: f64,
    ) -> crate::transactions::Result<bool> {
        Ok(self.transactions.read().unwrap().iter().any(|t| {
            t.transaction_date == date
                && t.ticker == ticker
                && t.quantity == Decimal::try_from(quantity).unwrap_or_default()
                && t.unit_price == Decimal::try_from(unit_price).unwrap_or_default()
        }))
    }

    fn distinct_tickers(&self) -> crate::transactions::Result<Vec<String>> {
        let mut tickers: Vec<String> = self
            .transactions
            .read()
            .unwrap()
            .iter()
            .map(|t| t.ticker.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        tickers.sort();
        Ok(tickers)
    }

    fn first_transaction_date(&self) -> crate::transactions::Result<Option<NaiveDate>> {
        Ok(self
            .transactions
            .read()
            .unwrap()
            .iter()
            .map(|t| t.transaction_date)
            .min())
    }
}

// --- Mock derived-state repository ---

#[derive(Default)]
pub struct MockPositionRepository {
    pub positions: Vec<Position>,
    pub realized_gains: Vec<RealizedGain>,
    pub replaced: Mutex<Vec<String>>,
}

impl MockPositionRepository {
    pub fn new(positions: Vec<Position>, realized_gains: Vec<RealizedGain>) -> Self {
        Self {
            positions,
            realized_gains,
            replaced: Mutex::new(Vec::new()),
        }
    }
}

impl PositionRepositoryTrait for MockPositionRepository {
    fn get_positions(&self) -> RepositoryResult<Vec<Position>> {
        Ok(self.positions.clone())
    }

    fn get_position(&self, ticker: &str) -> RepositoryResult<Option<Position>> {
        Ok(self.positions.iter().find(|p| p.ticker == ticker).cloned())
    }

    fn get_realized_gains(&self) -> RepositoryResult<Vec<RealizedGain>> {
        Ok(self.realized_gains.clone())
    }

    fn get_realized_gains_for_ticker(&self, ticker: &str) -> RepositoryResult<Vec<RealizedGain>> {
        Ok(self
            .realized_gains
            .iter()
            .filter(|g| g.ticker == ticker)
            .cloned()
            .collect())
    }

    fn get_realized_gains_for_date(
        &self,
        sell_date: NaiveDate,
    ) -> RepositoryResult<Vec<RealizedGain>> {
        Ok(self
            .realized_gains
            .iter()
            .filter(|g| g.sell_date == sell_date)
            .cloned()
            .collect())
    }

    fn get_realized_gains_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RealizedGain>> {
        Ok(self
            .realized_gains
            .iter()
            .filter(|g| g.sell_date >= start && g.sell_date <= end)
            .cloned()
            .collect())
    }

    fn replace_derived_state(
        &self,
        ticker: &str,
        _position: Option<&Position>,
        _realized_gains: &[RealizedGain],
    ) -> std::result::Result<(), AccountingError> {
        self.replaced.lock().unwrap().push(ticker.to_string());
        Ok(())
    }
}

// --- Mock dividend repository ---

pub struct MockDividendRepository {
    pub dividends: Vec<Dividend>,
}

impl MockDividendRepository {
    pub fn new(dividends: Vec<Dividend>) -> Self {
        Self { dividends }
    }
}

impl DividendRepositoryTrait for MockDividendRepository {
    fn get_all(&self) -> Result<Vec<Dividend>> {
        Ok(self.dividends.clone())
    }

    fn get_by_ticker(&self, ticker: &str) -> Result<Vec<Dividend>> {
        Ok(self
            .dividends
            .iter()
            .filter(|d| d.ticker == ticker)
            .cloned()
            .collect())
    }

    fn get_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Dividend>> {
        Ok(self
            .dividends
            .iter()
            .filter(|d| d.ex_date >= start && d.ex_date <= end)
            .cloned()
            .collect())
    }

    fn get_for_date(&self, ex_date: NaiveDate) -> Result<Vec<Dividend>> {
        Ok(self
            .dividends
            .iter()
            .filter(|d| d.ex_date == ex_date)
            .cloned()
            .collect())
    }

    fn upsert(&self, _dividends: &[Dividend]) -> Result<()> {
        unimplemented!("MockDividendRepository::upsert")
    }
}

// --- Mock market data service ---

pub struct MockMarketDataService {
    pub quotes: HashMap<(String, NaiveDate), Quote>,
    pub splits: Vec<SplitEvent>,
}

impl MockMarketDataService {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|q| ((q.symbol.clone(), q.date), q))
                .collect(),
            splits: Vec::new(),
        }
    }

    pub fn with_splits(mut self, splits: Vec<SplitEvent>) -> Self {
        self.splits = splits;
        self
    }

    fn sorted_quotes_for(&self, symbol: &str) -> Vec<&Quote> {
        let mut rows: Vec<&Quote> = self
            .quotes
            .values()
            .filter(|q| q.symbol == symbol)
            .collect();
        rows.sort_by_key(|q| q.date);
        rows
    }
}

#[async_trait]
impl MarketDataServiceTrait for MockMarketDataService {
    fn get_price(&self, symbol: &str, date: NaiveDate) -> Option<Decimal> {
        self.sorted_quotes_for(symbol)
            .iter()
            .rev()
            .find(|q| q.date <= date)
            .map(|q| q.close)
    }

    fn get_previous_trading_day_price(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Option<(NaiveDate, Decimal)> {
        self.sorted_quotes_for(symbol)
            .iter()
            .rev()
            .find(|q| q.date < date)
            .map(|q| (q.date, q.close))
    }

    fn get_daily_quotes(
        &self,
        symbols: &HashSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<(String, NaiveDate), Quote>> {
        Ok(self
            .quotes
            .iter()
            .filter(|((symbol, date), _)| {
                symbols.contains(symbol) && *date >= start && *date <= end
            })
            .map(|(key, quote)| (key.clone(), quote.clone()))
            .collect())
    }

    fn trading_days(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        let mut days: Vec<NaiveDate> = self
            .quotes
            .keys()
            .map(|(_, date)| *date)
            .filter(|date| *date >= start && *date <= end)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        days.sort();
        Ok(days)
    }

    fn get_split_ratio(&self, ticker: &str, from: NaiveDate, to: NaiveDate) -> Decimal {
        self.splits
            .iter()
            .filter(|s| s.ticker == ticker && s.split_date > from && s.split_date <= to)
            .fold(Decimal::ONE, |acc, s| acc * s.ratio)
    }

    fn get_latest_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        Ok(self.sorted_quotes_for(symbol).last().cloned().cloned())
    }

    fn get_latest_quote_pair(&self, symbol: &str) -> Result<Option<LatestQuotePair>> {
        let rows = self.sorted_quotes_for(symbol);
        match rows.len() {
            0 => Ok(None),
            n => Ok(Some(LatestQuotePair {
                latest: rows[n - 1].clone(),
                previous: if n >= 2 { Some(rows[n - 2].clone()) } else { None },
            })),
        }
    }

    fn upsert_quotes(&self, _quotes: Vec<Quote>) -> Result<()> {
        unimplemented!("MockMarketDataService::upsert_quotes")
    }

    async fn sync_quotes(
        &self,
        _symbols: &[String],
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<(String, String)>> {
        unimplemented!("MockMarketDataService::sync_quotes")
    }
}

// --- Mock FX service ---

#[derive(Default)]
pub struct MockFxService {
    pub rates: RwLock<HashMap<(String, String, NaiveDate), Decimal>>,
}

impl MockFxService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rate(&self, from: &str, to: &str, date: NaiveDate, rate: Decimal) {
        self.rates
            .write()
            .unwrap()
            .insert((from.to_string(), to.to_string(), date), rate);
    }
}

impl FxServiceTrait for MockFxService {
    fn get_rate_for_date(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> std::result::Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.rates
            .read()
            .unwrap()
            .get(&(from.to_string(), to.to_string(), date))
            .copied()
            .ok_or_else(|| FxError::RateNotFound(format!("{}->{} on {}", from, to, date)))
    }

    fn get_latest_rate(&self, from: &str, to: &str) -> std::result::Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        self.rates
            .read()
            .unwrap()
            .iter()
            .filter(|((f, t, _), _)| f == from && t == to)
            .max_by_key(|((_, _, date), _)| *date)
            .map(|(_, rate)| *rate)
            .ok_or_else(|| FxError::RateNotFound(format!("{}->{}", from, to)))
    }

    fn convert_for_date(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> std::result::Result<Decimal, FxError> {
        Ok(amount * self.get_rate_for_date(from, to, date)?)
    }

    fn rate_or_unit(&self, from: &str, to: &str, date: NaiveDate) -> Decimal {
        match self.get_rate_for_date(from, to, date) {
            Ok(rate) if rate > Decimal::ZERO => rate,
            _ => Decimal::ONE,
        }
    }

    fn add_rate(
        &self,
        _new_rate: NewExchangeRate,
    ) -> std::result::Result<ExchangeRate, FxError> {
        unimplemented!("MockFxService::add_rate")
    }
}

// --- Mock benchmark repository ---

pub struct MockBenchmarkRepository {
    pub quotes: Vec<BenchmarkQuote>,
}

impl MockBenchmarkRepository {
    pub fn new(quotes: Vec<BenchmarkQuote>) -> Self {
        Self { quotes }
    }
}

impl BenchmarkRepositoryTrait for MockBenchmarkRepository {
    fn get_quotes_in_range(
        &self,
        benchmark_key: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkQuote>> {
        let mut rows: Vec<BenchmarkQuote> = self
            .quotes
            .iter()
            .filter(|q| q.benchmark_key == benchmark_key && q.date >= start && q.date <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|q| q.date);
        Ok(rows)
    }

    fn get_latest_quote(&self, benchmark_key: &str) -> Result<Option<BenchmarkQuote>> {
        Ok(self
            .quotes
            .iter()
            .filter(|q| q.benchmark_key == benchmark_key)
            .max_by_key(|q| q.date)
            .cloned())
    }

    fn upsert_quotes(&self, _quotes: &[BenchmarkQuote]) -> Result<()> {
        unimplemented!("MockBenchmarkRepository::upsert_quotes")
    }
}

