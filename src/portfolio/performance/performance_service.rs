use chrono::{Datelike, Duration, NaiveDate};
use dashmap::DashMap;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::performance_model::{
    BenchmarkPoint, DailyDetail, DividendIncomeDetail, Granularity, HoldingPnlDetail,
    MonthlyDetail, PeriodPnl, RealizedPnlDetail,
};
use crate::benchmarks::{self, BenchmarkRepositoryTrait};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, MAX_QUOTE_PAD_DAYS, PRICE_WINDOW_BUFFER_DAYS};
use crate::dividends::{Dividend, DividendRepositoryTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::fx::{CurrencyClassifier, FxServiceTrait};
use crate::market_data::{MarketDataServiceTrait, Quote};
use crate::portfolio::accounting::{position_accountant, PositionRepositoryTrait, RealizedGain};
use crate::transactions::{Transaction, TransactionRepositoryTrait, TransactionSide};

pub trait PerformanceServiceTrait: Send + Sync {
    /// Per-period P&L decomposition over `[start, end]`, normalized to the
    /// base currency.
    fn history(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> Result<Vec<PeriodPnl>>;

    /// Per-ticker breakdown of one trading day.
    fn daily_detail(&self, date: NaiveDate) -> Result<DailyDetail>;

    /// Per-ticker breakdown of one calendar month (`YYYY-MM`).
    fn monthly_detail(&self, month: &str) -> Result<MonthlyDetail>;

    /// Counterfactual benchmark series over `[start, end]`.
    fn benchmark_overlay(
        &self,
        benchmark_key: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkPoint>>;
}

/// Prefetched ledger and price state for one attribution run.
struct AttributionContext {
    transactions: Vec<Transaction>,
    quotes: HashMap<(String, NaiveDate), Quote>,
    /// Union of quote dates across all relevant symbols, ascending — the
    /// engine's trading-day calendar.
    trading_days: Vec<NaiveDate>,
    /// Padded close per (symbol, day); `None` is cached too so a symbol
    /// with a long gap is not rescanned for every period.
    pad_cache: DashMap<(String, NaiveDate), Option<Decimal>>,
}

impl AttributionContext {
    /// Close on `date`, padding back to the most recent close within the
    /// lookback bound.
    fn padded_close(&self, symbol: &str, date: NaiveDate) -> Option<Decimal> {
        self.pad_cache
            .entry((symbol.to_string(), date))
            .or_insert_with(|| {
                (0..=MAX_QUOTE_PAD_DAYS).find_map(|days_back| {
                    let lookup = date - Duration::days(days_back);
                    self.quotes
                        .get(&(symbol.to_string(), lookup))
                        .map(|q| q.close)
                })
            })
            .clone()
    }

    fn holdings_at(&self, date: NaiveDate) -> HashMap<String, Decimal> {
        position_accountant::quantities_as_of(&self.transactions, date)
    }

    /// Split-adjusted weighted-average acquisition price of the BUYs of
    /// `ticker` in `(window_start, window_end]`. Used as the "previous
    /// price" of a position that did not exist at the prior month-end.
    fn window_buy_average(
        &self,
        ticker: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
        market_data: &dyn MarketDataServiceTrait,
    ) -> Option<Decimal> {
        let mut total_quantity = Decimal::ZERO;
        let mut total_value = Decimal::ZERO;

        for tx in &self.transactions {
            if tx.ticker != ticker
                || tx.side != TransactionSide::Buy
                || tx.transaction_date <= window_start
                || tx.transaction_date > window_end
            {
                continue;
            }
            // The quote series reports splits retroactively; the recorded
            // acquisition price has to be brought onto the same basis.
            let ratio = market_data.get_split_ratio(ticker, tx.transaction_date, window_end);
            total_quantity += tx.quantity;
            total_value += tx.quantity * tx.unit_price * ratio;
        }

        if total_quantity.is_zero() {
            None
        } else {
            Some(total_value / total_quantity)
        }
    }
}

pub struct PerformanceService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    position_repository: Arc<dyn PositionRepositoryTrait>,
    dividend_repository: Arc<dyn DividendRepositoryTrait>,
    market_data_service: Arc<dyn MarketDataServiceTrait>,
    fx_service: Arc<dyn FxServiceTrait>,
    benchmark_repository: Arc<dyn BenchmarkRepositoryTrait>,
    classifier: CurrencyClassifier,
    base_currency: Arc<RwLock<String>>,
}

impl PerformanceService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        position_repository: Arc<dyn PositionRepositoryTrait>,
        dividend_repository: Arc<dyn DividendRepositoryTrait>,
        market_data_service: Arc<dyn MarketDataServiceTrait>,
        fx_service: Arc<dyn FxServiceTrait>,
        benchmark_repository: Arc<dyn BenchmarkRepositoryTrait>,
        classifier: CurrencyClassifier,
        base_currency: Arc<RwLock<String>>,
    ) -> Self {
        Self {
            transaction_repository,
            position_repository,
            dividend_repository,
            market_data_service,
            fx_service,
            benchmark_repository,
            classifier,
            base_currency,
        }
    }

    fn base_currency(&self) -> String {
        self.base_currency.read().unwrap().clone()
    }

    /// FX rate from the ticker's listing currency into the base currency,
    /// degrading to 1.0 when the rate is unavailable.
    fn ticker_rate(&self, ticker: &str, base_currency: &str, date: NaiveDate) -> Decimal {
        let currency = self.classifier.classify(ticker);
        self.fx_service
            .rate_or_unit(currency.as_str(), base_currency, date)
    }

    /// Loads the ledger and every relevant quote once per run. `None` when
    /// the ledger is empty.
    fn build_context(&self, start: NaiveDate, end: NaiveDate) -> Result<Option<AttributionContext>> {
        let transactions = self.transaction_repository.get_all()?;
        if transactions.is_empty() {
            return Ok(None);
        }

        let first_tx_date = transactions
            .iter()
            .map(|t| t.transaction_date)
            .min()
            .expect("ledger is non-empty");
        let download_start =
            start.min(first_tx_date) - Duration::days(PRICE_WINDOW_BUFFER_DAYS);

        let tickers: HashSet<String> =
            transactions.iter().map(|t| t.ticker.clone()).collect();

        let quotes = self
            .market_data_service
            .get_daily_quotes(&tickers, download_start, end)?;
        let trading_days = self.market_data_service.trading_days(download_start, end)?;

        debug!(
            "Attribution context: {} transactions, {} tickers, {} trading days",
            transactions.len(),
            tickers.len(),
            trading_days.len()
        );

        Ok(Some(AttributionContext {
            transactions,
            quotes,
            trading_days,
            pad_cache: DashMap::new(),
        }))
    }

    fn realized_by_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, Vec<RealizedGain>>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<RealizedGain>> = BTreeMap::new();
        for gain in self
            .position_repository
            .get_realized_gains_in_range(start, end)?
        {
            grouped.entry(gain.sell_date).or_default().push(gain);
        }
        Ok(grouped)
    }

    fn dividends_by_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, Vec<Dividend>>> {
        let mut grouped: BTreeMap<NaiveDate, Vec<Dividend>> = BTreeMap::new();
        for dividend in self.dividend_repository.get_in_range(start, end)? {
            grouped.entry(dividend.ex_date).or_default().push(dividend);
        }
        Ok(grouped)
    }

    fn dividend_income_for(
        &self,
        dividends: &[Dividend],
        holdings: &HashMap<String, Decimal>,
        base_currency: &str,
        rate_date: NaiveDate,
    ) -> Decimal {
        let mut income = Decimal::ZERO;
        for dividend in dividends {
            let quantity = match holdings.get(&dividend.ticker) {
                Some(q) if *q > Decimal::ZERO => *q,
                _ => continue,
            };
            let rate = self
                .fx_service
                .rate_or_unit(&dividend.currency, base_currency, rate_date);
            income += dividend.amount_per_share * quantity * rate;
        }
        income
    }

    fn daily_history(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PeriodPnl>> {
        let base_currency = self.base_currency();
        let ctx = match self.build_context(start, end)? {
            Some(ctx) => ctx,
            None => return Ok(Vec::new()),
        };

        let realized_by_date = self.realized_by_date(start, end)?;
        let dividends_by_date = self.dividends_by_date(start, end)?;

        let mut results = Vec::new();
        for (i, &day) in ctx.trading_days.iter().enumerate() {
            if day < start || i == 0 {
                continue;
            }
            let prev_day = ctx.trading_days[i - 1];
            let holdings = ctx.holdings_at(day);

            let mut holding_pnl = Decimal::ZERO;
            let mut portfolio_value = Decimal::ZERO;

            for (ticker, quantity) in &holdings {
                let rate = self.ticker_rate(ticker, &base_currency, day);

                let curr = ctx.padded_close(ticker, day);
                if let Some(curr) = curr {
                    portfolio_value += curr * *quantity * rate;
                }

                match (curr, ctx.padded_close(ticker, prev_day)) {
                    (Some(curr), Some(prev)) => {
                        holding_pnl += (curr - prev) * *quantity * rate;
                    }
                    _ => {
                        warn!(
                            "Skipping {} on {}: price missing for the day or its predecessor",
                            ticker, day
                        );
                    }
                }
            }

            let realized_pnl = realized_by_date
                .get(&day)
                .map(|gains| gains.iter().map(|g| g.realized_pnl).sum())
                .unwrap_or(Decimal::ZERO);

            let dividend_income = dividends_by_date
                .get(&day)
                .map(|dividends| {
                    self.dividend_income_for(dividends, &holdings, &base_currency, day)
                })
                .unwrap_or(Decimal::ZERO);

            results.push(PeriodPnl {
                period: day.format("%Y-%m-%d").to_string(),
                holding_pnl: holding_pnl.round_dp(DISPLAY_DECIMAL_PRECISION),
                realized_pnl: realized_pnl.round_dp(DISPLAY_DECIMAL_PRECISION),
                dividend_income: dividend_income.round_dp(DISPLAY_DECIMAL_PRECISION),
                total: (holding_pnl + realized_pnl + dividend_income)
                    .round_dp(DISPLAY_DECIMAL_PRECISION),
                portfolio_value: portfolio_value.round_dp(DISPLAY_DECIMAL_PRECISION),
            });
        }

        Ok(results)
    }

    /// Last trading day of each calendar month present in the calendar.
    fn month_ends(trading_days: &[NaiveDate]) -> Vec<NaiveDate> {
        let mut ends: Vec<NaiveDate> = Vec::new();
        for &day in trading_days {
            match ends.last_mut() {
                Some(last) if (last.year(), last.month()) == (day.year(), day.month()) => {
                    *last = day;
                }
                _ => ends.push(day),
            }
        }
        ends
    }

    /// Holding P&L of one ticker between two month-ends.
    ///
    /// A position whose entire quantity was acquired inside the month has
    /// no meaningful prior month-end close; its baseline is the
    /// split-adjusted weighted-average acquisition price of the month's
    /// buys instead.
    #[allow(clippy::too_many_arguments)]
    fn monthly_ticker_pnl(
        &self,
        ctx: &AttributionContext,
        ticker: &str,
        quantity: Decimal,
        carried_in: bool,
        prev_month_end: NaiveDate,
        month_end: NaiveDate,
        base_currency: &str,
    ) -> Option<HoldingPnlDetail> {
        let curr = match ctx.padded_close(ticker, month_end) {
            Some(curr) => curr,
            None => {
                warn!("Skipping {} for month ending {}: no close", ticker, month_end);
                return None;
            }
        };

        let prev = if carried_in {
            ctx.padded_close(ticker, prev_month_end)
        } else {
            ctx.window_buy_average(
                ticker,
                prev_month_end,
                month_end,
                self.market_data_service.as_ref(),
            )
        };

        let prev = match prev {
            Some(prev) => prev,
            None => {
                warn!(
                    "Skipping {} for month ending {}: no baseline price",
                    ticker, month_end
                );
                return None;
            }
        };

        let currency = self.classifier.classify(ticker);
        let rate = self
            .fx_service
            .rate_or_unit(currency.as_str(), base_currency, month_end);

        Some(HoldingPnlDetail {
            ticker: ticker.to_string(),
            security_name: None,
            quantity,
            prev_price: prev,
            curr_price: curr,
            price_change: curr - prev,
            currency: currency.as_str().to_string(),
            exchange_rate: rate,
            pnl: ((curr - prev) * quantity * rate).round_dp(DISPLAY_DECIMAL_PRECISION),
        })
    }

    fn monthly_history(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PeriodPnl>> {
        let base_currency = self.base_currency();
        let ctx = match self.build_context(start, end)? {
            Some(ctx) => ctx,
            None => return Ok(Vec::new()),
        };

        let month_ends = Self::month_ends(&ctx.trading_days);
        let realized_by_date = self.realized_by_date(start, end)?;
        let dividends_by_date = self.dividends_by_date(start, end)?;

        let mut results = Vec::new();
        for window in month_ends.windows(2) {
            let (prev_month_end, month_end) = (window[0], window[1]);
            if month_end < start || month_end > end {
                continue;
            }

            let holdings = ctx.holdings_at(month_end);
            let carried = ctx.holdings_at(prev_month_end);
            let mut holding_pnl = Decimal::ZERO;
            let mut portfolio_value = Decimal::ZERO;

            for (ticker, quantity) in &holdings {
                let rate = self.ticker_rate(ticker, &base_currency, month_end);
                if let Some(curr) = ctx.padded_close(ticker, month_end) {
                    portfolio_value += curr * *quantity * rate;
                }
                if let Some(detail) = self.monthly_ticker_pnl(
                    &ctx,
                    ticker,
                    *quantity,
                    carried.contains_key(ticker),
                    prev_month_end,
                    month_end,
                    &base_currency,
                ) {
                    holding_pnl += detail.pnl;
                }
            }

            let mut realized_pnl = Decimal::ZERO;
            for (&sell_date, gains) in realized_by_date.range(..=month_end) {
                if sell_date > prev_month_end {
                    realized_pnl += gains.iter().map(|g| g.realized_pnl).sum::<Decimal>();
                }
            }

            let mut dividend_income = Decimal::ZERO;
            for (&ex_date, dividends) in dividends_by_date.range(..=month_end) {
                if ex_date > prev_month_end {
                    let holdings_at_ex = ctx.holdings_at(ex_date);
                    dividend_income += self.dividend_income_for(
                        dividends,
                        &holdings_at_ex,
                        &base_currency,
                        ex_date,
                    );
                }
            }

            results.push(PeriodPnl {
                period: month_end.format("%Y-%m").to_string(),
                holding_pnl: holding_pnl.round_dp(DISPLAY_DECIMAL_PRECISION),
                realized_pnl: realized_pnl.round_dp(DISPLAY_DECIMAL_PRECISION),
                dividend_income: dividend_income.round_dp(DISPLAY_DECIMAL_PRECISION),
                total: (holding_pnl + realized_pnl + dividend_income)
                    .round_dp(DISPLAY_DECIMAL_PRECISION),
                portfolio_value: portfolio_value.round_dp(DISPLAY_DECIMAL_PRECISION),
            });
        }

        Ok(results)
    }

    fn security_names(transactions: &[Transaction]) -> HashMap<String, String> {
        let mut names = HashMap::new();
        for tx in transactions {
            if let Some(name) = &tx.security_name {
                names.entry(tx.ticker.clone()).or_insert_with(|| name.clone());
            }
        }
        names
    }
}

impl PerformanceServiceTrait for PerformanceService {
    fn history(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
    ) -> Result<Vec<PeriodPnl>> {
        if start > end {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Start date must be before end date".to_string(),
            )));
        }
        match granularity {
            Granularity::Daily => self.daily_history(start, end),
            Granularity::Monthly => self.monthly_history(start, end),
        }
    }

    fn daily_detail(&self, date: NaiveDate) -> Result<DailyDetail> {
        let base_currency = self.base_currency();
        let ctx = match self.build_context(date, date)? {
            Some(ctx) => ctx,
            None => return Ok(DailyDetail::empty(date)),
        };

        // Pad to the last trading day at or before the requested date, and
        // require a predecessor to diff against.
        let day_index = match ctx.trading_days.iter().rposition(|&d| d <= date) {
            Some(index) if index > 0 => index,
            _ => return Ok(DailyDetail::empty(date)),
        };
        let day = ctx.trading_days[day_index];
        let prev_day = ctx.trading_days[day_index - 1];

        let names = Self::security_names(&ctx.transactions);
        let holdings = ctx.holdings_at(date);
        let mut tickers: Vec<&String> = holdings.keys().collect();
        tickers.sort();

        let mut holding_details = Vec::new();
        for ticker in tickers {
            let quantity = holdings[ticker];
            let (curr, prev) = match (
                ctx.padded_close(ticker, day),
                ctx.padded_close(ticker, prev_day),
            ) {
                (Some(curr), Some(prev)) => (curr, prev),
                _ => continue,
            };

            let currency = self.classifier.classify(ticker);
            let rate = self
                .fx_service
                .rate_or_unit(currency.as_str(), &base_currency, day);

            holding_details.push(HoldingPnlDetail {
                ticker: ticker.clone(),
                security_name: names.get(ticker).cloned(),
                quantity,
                prev_price: prev,
                curr_price: curr,
                price_change: curr - prev,
                currency: currency.as_str().to_string(),
                exchange_rate: rate,
                pnl: ((curr - prev) * quantity * rate).round_dp(DISPLAY_DECIMAL_PRECISION),
            });
        }

        let realized_details = self
            .position_repository
            .get_realized_gains_for_date(date)?
            .into_iter()
            .map(|gain| RealizedPnlDetail {
                security_name: names.get(&gain.ticker).cloned(),
                ticker: gain.ticker,
                quantity: gain.quantity,
                average_cost: gain.average_cost,
                sell_price: gain.sell_price,
                pnl: gain.realized_pnl.round_dp(DISPLAY_DECIMAL_PRECISION),
            })
            .collect();

        let mut dividend_details = Vec::new();
        for dividend in self.dividend_repository.get_for_date(date)? {
            let quantity = match holdings.get(&dividend.ticker) {
                Some(q) if *q > Decimal::ZERO => *q,
                _ => continue,
            };
            let rate = self
                .fx_service
                .rate_or_unit(&dividend.currency, &base_currency, day);

            dividend_details.push(DividendIncomeDetail {
                security_name: names.get(&dividend.ticker).cloned(),
                ticker: dividend.ticker,
                quantity,
                amount_per_share: dividend.amount_per_share,
                currency: dividend.currency,
                exchange_rate: rate,
                total_amount: (dividend.amount_per_share * quantity * rate)
                    .round_dp(DISPLAY_DECIMAL_PRECISION),
            });
        }

        Ok(DailyDetail {
            date,
            holding_details,
            realized_details,
            dividend_details,
        })
    }

    fn monthly_detail(&self, month: &str) -> Result<MonthlyDetail> {
        let month_start = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
            .map_err(|e| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Invalid month '{}': {}",
                    month, e
                )))
            })?;
        let month_end_cal = if month_start.month() == 12 {
            NaiveDate::from_ymd_opt(month_start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(month_start.year(), month_start.month() + 1, 1)
        }
        .expect("valid successor month")
            - Duration::days(1);

        let base_currency = self.base_currency();
        let ctx = match self.build_context(month_start, month_end_cal)? {
            Some(ctx) => ctx,
            None => return Ok(MonthlyDetail::empty(month)),
        };

        let month_end = match ctx
            .trading_days
            .iter()
            .rev()
            .find(|&&d| d >= month_start && d <= month_end_cal)
        {
            Some(&d) => d,
            None => return Ok(MonthlyDetail::empty(month)),
        };
        let prev_month_end = match ctx.trading_days.iter().rev().find(|&&d| d < month_start) {
            Some(&d) => d,
            None => return Ok(MonthlyDetail::empty(month)),
        };

        let names = Self::security_names(&ctx.transactions);
        let holdings = ctx.holdings_at(month_end);
        let carried = ctx.holdings_at(prev_month_end);
        let mut tickers: Vec<&String> = holdings.keys().collect();
        tickers.sort();

        let mut holding_details = Vec::new();
        for ticker in tickers {
            if let Some(mut detail) = self.monthly_ticker_pnl(
                &ctx,
                ticker,
                holdings[ticker],
                carried.contains_key(ticker),
                prev_month_end,
                month_end,
                &base_currency,
            ) {
                detail.security_name = names.get(ticker).cloned();
                holding_details.push(detail);
            }
        }

        let realized_details = self
            .position_repository
            .get_realized_gains_in_range(month_start, month_end_cal)?
            .into_iter()
            .map(|gain| RealizedPnlDetail {
                security_name: names.get(&gain.ticker).cloned(),
                ticker: gain.ticker,
                quantity: gain.quantity,
                average_cost: gain.average_cost,
                sell_price: gain.sell_price,
                pnl: gain.realized_pnl.round_dp(DISPLAY_DECIMAL_PRECISION),
            })
            .collect();

        let mut dividend_details = Vec::new();
        for dividend in self
            .dividend_repository
            .get_in_range(month_start, month_end_cal)?
        {
            let holdings_at_ex = ctx.holdings_at(dividend.ex_date);
            let quantity = match holdings_at_ex.get(&dividend.ticker) {
                Some(q) if *q > Decimal::ZERO => *q,
                _ => continue,
            };
            let rate =
                self.fx_service
                    .rate_or_unit(&dividend.currency, &base_currency, dividend.ex_date);

            dividend_details.push(DividendIncomeDetail {
                security_name: names.get(&dividend.ticker).cloned(),
                ticker: dividend.ticker,
                quantity,
                amount_per_share: dividend.amount_per_share,
                currency: dividend.currency,
                exchange_rate: rate,
                total_amount: (dividend.amount_per_share * quantity * rate)
                    .round_dp(DISPLAY_DECIMAL_PRECISION),
            });
        }

        Ok(MonthlyDetail {
            month: month.to_string(),
            holding_details,
            realized_details,
            dividend_details,
        })
    }

    fn benchmark_overlay(
        &self,
        benchmark_key: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkPoint>> {
        let info = benchmarks::lookup(benchmark_key).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown benchmark: {}",
                benchmark_key
            )))
        })?;

        let quotes = self.benchmark_repository.get_quotes_in_range(
            info.key,
            start - Duration::days(PRICE_WINDOW_BUFFER_DAYS),
            end,
        )?;
        if quotes.len() < 2 {
            return Ok(Vec::new());
        }

        // Portfolio values keyed by day; the overlay needs the value of the
        // benchmark's previous trading day, which may fall before `start`.
        let portfolio_values: BTreeMap<NaiveDate, Decimal> = self
            .daily_history(start - Duration::days(PRICE_WINDOW_BUFFER_DAYS), end)?
            .into_iter()
            .filter_map(|p| {
                NaiveDate::parse_from_str(&p.period, "%Y-%m-%d")
                    .ok()
                    .map(|date| (date, p.portfolio_value))
            })
            .collect();
        let value_as_of = |date: NaiveDate| {
            portfolio_values
                .range(..=date)
                .next_back()
                .map(|(_, v)| *v)
                .unwrap_or(Decimal::ZERO)
        };

        let window_start_close = match quotes.iter().find(|q| q.date >= start) {
            Some(quote) if quote.close > Decimal::ZERO => quote.close,
            _ => {
                warn!(
                    "Benchmark {} has no usable close at window start",
                    benchmark_key
                );
                return Ok(Vec::new());
            }
        };

        let mut points = Vec::new();
        for window in quotes.windows(2) {
            let (prev, curr) = (&window[0], &window[1]);
            if curr.date < start {
                continue;
            }
            if prev.close <= Decimal::ZERO {
                warn!(
                    "Skipping benchmark day {}: non-positive previous close",
                    curr.date
                );
                continue;
            }

            let daily_return = (curr.close - prev.close) / prev.close;
            points.push(BenchmarkPoint {
                date: curr.date,
                close: curr.close,
                daily_return,
                virtual_pnl: (value_as_of(prev.date) * daily_return)
                    .round_dp(DISPLAY_DECIMAL_PRECISION),
                cumulative_return: (curr.close - window_start_close) / window_start_close,
            });
        }

        Ok(points)
    }
}
