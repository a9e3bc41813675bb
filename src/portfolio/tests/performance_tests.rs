use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, RwLock};

use super::support::{
    date, make_dividend, make_quote, make_transaction, MockBenchmarkRepository,
    MockDividendRepository, MockFxService, MockMarketDataService, MockPositionRepository,
    MockTransactionRepository,
};
use crate::benchmarks::BenchmarkQuote;
use crate::dividends::{Dividend, DividendService, DividendServiceTrait};
use crate::fx::CurrencyClassifier;
use crate::market_data::SplitEvent;
use crate::portfolio::accounting::RealizedGain;
use crate::portfolio::performance::{Granularity, PerformanceService, PerformanceServiceTrait};
use crate::transactions::{Transaction, TransactionSide};

fn buy(ticker: &str, date_str: &str, qty: Decimal, price: Decimal, seq: i64) -> Transaction {
    make_transaction(
        &format!("tx{}", seq),
        ticker,
        TransactionSide::Buy,
        date_str,
        qty,
        price,
        Decimal::ZERO,
        Some(qty * price),
        "JPY",
        seq,
    )
}

fn make_gain(ticker: &str, sell_date: NaiveDate, pnl: Decimal) -> RealizedGain {
    RealizedGain {
        id: format!("gain_{}_{}", ticker, sell_date),
        ticker: ticker.to_string(),
        sell_date,
        quantity: dec!(10),
        average_cost: dec!(100),
        sell_price: dec!(110),
        realized_pnl: pnl,
        realized_pnl_pct: Some(dec!(10)),
        commission: Decimal::ZERO,
        currency: "JPY".to_string(),
        created_at: chrono::Utc::now().naive_utc(),
    }
}

fn build_service(
    transactions: Vec<Transaction>,
    gains: Vec<RealizedGain>,
    dividends: Vec<Dividend>,
    market_data: MockMarketDataService,
    fx: MockFxService,
    benchmark_quotes: Vec<BenchmarkQuote>,
) -> PerformanceService {
    PerformanceService::new(
        Arc::new(MockTransactionRepository::new(transactions)),
        Arc::new(MockPositionRepository::new(Vec::new(), gains)),
        Arc::new(MockDividendRepository::new(dividends)),
        Arc::new(market_data),
        Arc::new(fx),
        Arc::new(MockBenchmarkRepository::new(benchmark_quotes)),
        CurrencyClassifier::with_defaults(),
        Arc::new(RwLock::new("JPY".to_string())),
    )
}

#[test]
fn daily_holding_pnl_follows_the_price_move() {
    let transactions = vec![buy("7203", "2024-03-01", dec!(10), dec!(95), 1)];
    let quotes = vec![
        make_quote("7203", date(2024, 3, 4), dec!(100), "JPY"),
        make_quote("7203", date(2024, 3, 5), dec!(105), "JPY"),
    ];

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 3, 1), date(2024, 3, 5), Granularity::Daily)
        .unwrap();

    assert_eq!(history.len(), 1);
    let day = &history[0];
    assert_eq!(day.period, "2024-03-05");
    assert_eq!(day.holding_pnl, dec!(50.00));
    assert_eq!(day.realized_pnl, Decimal::ZERO);
    assert_eq!(day.dividend_income, Decimal::ZERO);
    assert_eq!(day.total, dec!(50.00));
    assert_eq!(day.portfolio_value, dec!(1050.00));
}

#[test]
fn realized_and_dividend_components_land_on_their_dates() {
    let transactions = vec![buy("7203", "2024-03-01", dec!(10), dec!(95), 1)];
    let quotes = vec![
        make_quote("7203", date(2024, 3, 4), dec!(100), "JPY"),
        make_quote("7203", date(2024, 3, 5), dec!(105), "JPY"),
    ];
    let gains = vec![make_gain("7203", date(2024, 3, 5), dec!(123.45))];
    let dividends = vec![make_dividend("7203", date(2024, 3, 5), dec!(5), "JPY")];

    let service = build_service(
        transactions,
        gains,
        dividends,
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 3, 1), date(2024, 3, 5), Granularity::Daily)
        .unwrap();

    let day = &history[0];
    assert_eq!(day.realized_pnl, dec!(123.45));
    assert_eq!(day.dividend_income, dec!(50.00));
    assert_eq!(day.total, dec!(50) + dec!(123.45) + dec!(50));
}

#[test]
fn foreign_holdings_convert_at_the_daily_rate() {
    let transactions = vec![buy("AAPL", "2024-03-01", dec!(10), dec!(95), 1)];
    let quotes = vec![
        make_quote("AAPL", date(2024, 3, 4), dec!(100), "USD"),
        make_quote("AAPL", date(2024, 3, 5), dec!(105), "USD"),
    ];
    let fx = MockFxService::new();
    fx.add_rate("USD", "JPY", date(2024, 3, 5), dec!(150));

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes),
        fx,
        Vec::new(),
    );

    let history = service
        .history(date(2024, 3, 1), date(2024, 3, 5), Granularity::Daily)
        .unwrap();

    assert_eq!(history[0].holding_pnl, dec!(7500.00));
    assert_eq!(history[0].portfolio_value, dec!(157500.00));
}

#[test]
fn missing_fx_rate_degrades_to_unit_instead_of_failing() {
    let transactions = vec![buy("AAPL", "2024-03-01", dec!(10), dec!(95), 1)];
    let quotes = vec![
        make_quote("AAPL", date(2024, 3, 4), dec!(100), "USD"),
        make_quote("AAPL", date(2024, 3, 5), dec!(105), "USD"),
    ];

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 3, 1), date(2024, 3, 5), Granularity::Daily)
        .unwrap();

    assert_eq!(history[0].holding_pnl, dec!(50.00));
}

#[test]
fn ticker_without_a_previous_close_is_skipped_not_fatal() {
    let transactions = vec![
        buy("7203", "2024-03-01", dec!(10), dec!(95), 1),
        buy("6758", "2024-03-01", dec!(5), dec!(190), 2),
    ];
    // 6758 lists no quote before 3/5; its holding P&L cannot be computed
    // but its valuation still counts.
    let quotes = vec![
        make_quote("7203", date(2024, 3, 4), dec!(100), "JPY"),
        make_quote("7203", date(2024, 3, 5), dec!(105), "JPY"),
        make_quote("6758", date(2024, 3, 5), dec!(200), "JPY"),
    ];

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 3, 1), date(2024, 3, 5), Granularity::Daily)
        .unwrap();

    let day = history.last().unwrap();
    assert_eq!(day.holding_pnl, dec!(50.00));
    assert_eq!(day.portfolio_value, dec!(1050) + dec!(1000));
}

#[test]
fn monthly_carried_position_compares_month_end_closes() {
    let transactions = vec![buy("7203", "2024-03-10", dec!(20), dec!(85), 1)];
    let quotes = vec![
        make_quote("7203", date(2024, 3, 29), dec!(90), "JPY"),
        make_quote("7203", date(2024, 4, 30), dec!(120), "JPY"),
    ];

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 4, 1), date(2024, 4, 30), Granularity::Monthly)
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].period, "2024-04");
    assert_eq!(history[0].holding_pnl, dec!(600.00));
    assert_eq!(history[0].portfolio_value, dec!(2400.00));
}

#[test]
fn monthly_new_position_baselines_on_weighted_average_buy_price() {
    let transactions = vec![
        buy("7203", "2024-04-05", dec!(10), dec!(100), 1),
        buy("7203", "2024-04-20", dec!(10), dec!(110), 2),
    ];
    // A March close exists so April has a prior month-end, but the position
    // itself was opened inside April.
    let quotes = vec![
        make_quote("7203", date(2024, 3, 29), dec!(95), "JPY"),
        make_quote("7203", date(2024, 4, 30), dec!(120), "JPY"),
    ];

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 4, 1), date(2024, 4, 30), Granularity::Monthly)
        .unwrap();

    // Baseline (10*100 + 10*110) / 20 = 105, not the 95 month-end close.
    assert_eq!(history[0].holding_pnl, dec!(300.00));
}

#[test]
fn monthly_baseline_is_split_adjusted() {
    let transactions = vec![
        buy("7203", "2024-04-05", dec!(10), dec!(100), 1),
        buy("7203", "2024-04-20", dec!(10), dec!(110), 2),
    ];
    let quotes = vec![
        make_quote("7203", date(2024, 3, 29), dec!(95), "JPY"),
        make_quote("7203", date(2024, 4, 30), dec!(120), "JPY"),
    ];
    // 2-for-1 split on 4/10: the first buy's recorded price is halved to
    // match the retroactively adjusted series; the 4/20 buy is already on
    // the new basis.
    let splits = vec![SplitEvent::new("7203", date(2024, 4, 10), dec!(0.5))];

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes).with_splits(splits),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 4, 1), date(2024, 4, 30), Granularity::Monthly)
        .unwrap();

    // Baseline (10*100*0.5 + 10*110) / 20 = 80.
    assert_eq!(history[0].holding_pnl, dec!(800.00));
}

#[test]
fn benchmark_overlay_projects_portfolio_value_on_index_returns() {
    let transactions = vec![buy("7203", "2024-03-01", dec!(10), dec!(95), 1)];
    let quotes = vec![
        make_quote("7203", date(2024, 3, 29), dec!(100), "JPY"),
        make_quote("7203", date(2024, 4, 1), dec!(100), "JPY"),
        make_quote("7203", date(2024, 4, 2), dec!(100), "JPY"),
        make_quote("7203", date(2024, 4, 3), dec!(100), "JPY"),
    ];
    let benchmark_quotes = vec![
        BenchmarkQuote::new("SP500", "^GSPC", date(2024, 4, 1), dec!(100), "USD"),
        BenchmarkQuote::new("SP500", "^GSPC", date(2024, 4, 2), dec!(102), "USD"),
        BenchmarkQuote::new("SP500", "^GSPC", date(2024, 4, 3), dec!(101), "USD"),
    ];

    let service = build_service(
        transactions,
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        benchmark_quotes,
    );

    let points = service
        .benchmark_overlay("SP500", date(2024, 4, 1), date(2024, 4, 3))
        .unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, date(2024, 4, 2));
    assert_eq!(points[0].daily_return, dec!(0.02));
    assert_eq!(points[0].virtual_pnl, dec!(20.00));
    assert_eq!(points[0].cumulative_return, dec!(0.02));

    assert_eq!(points[1].date, date(2024, 4, 3));
    assert_eq!(points[1].daily_return, (dec!(101) - dec!(102)) / dec!(102));
    assert_eq!(points[1].virtual_pnl, dec!(-9.80));
    assert_eq!(points[1].cumulative_return, dec!(0.01));
}

#[test]
fn unknown_benchmark_is_a_validation_error() {
    let service = build_service(
        Vec::new(),
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(Vec::new()),
        MockFxService::new(),
        Vec::new(),
    );

    assert!(service
        .benchmark_overlay("FTSE100", date(2024, 4, 1), date(2024, 4, 3))
        .is_err());
}

#[test]
fn daily_detail_breaks_the_day_down_per_ticker() {
    let transactions = vec![buy("7203", "2024-03-01", dec!(10), dec!(95), 1)];
    let quotes = vec![
        make_quote("7203", date(2024, 3, 4), dec!(100), "JPY"),
        make_quote("7203", date(2024, 3, 5), dec!(105), "JPY"),
    ];
    let gains = vec![make_gain("7203", date(2024, 3, 5), dec!(123.45))];
    let dividends = vec![make_dividend("7203", date(2024, 3, 5), dec!(5), "JPY")];

    let service = build_service(
        transactions,
        gains,
        dividends,
        MockMarketDataService::new(quotes),
        MockFxService::new(),
        Vec::new(),
    );

    let detail = service.daily_detail(date(2024, 3, 5)).unwrap();

    assert_eq!(detail.holding_details.len(), 1);
    let holding = &detail.holding_details[0];
    assert_eq!(holding.prev_price, dec!(100));
    assert_eq!(holding.curr_price, dec!(105));
    assert_eq!(holding.pnl, dec!(50.00));

    assert_eq!(detail.realized_details.len(), 1);
    assert_eq!(detail.realized_details[0].pnl, dec!(123.45));

    assert_eq!(detail.dividend_details.len(), 1);
    assert_eq!(detail.dividend_details[0].total_amount, dec!(50.00));
}

#[test]
fn empty_ledger_yields_an_empty_series() {
    let service = build_service(
        Vec::new(),
        Vec::new(),
        Vec::new(),
        MockMarketDataService::new(Vec::new()),
        MockFxService::new(),
        Vec::new(),
    );

    let history = service
        .history(date(2024, 3, 1), date(2024, 3, 5), Granularity::Daily)
        .unwrap();
    assert!(history.is_empty());
}

#[test]
fn dividend_events_join_the_replayed_quantity() {
    let transactions = vec![
        buy("7203", "2024-03-01", dec!(10), dec!(95), 1),
        make_transaction(
            "tx2",
            "7203",
            TransactionSide::Sell,
            "2024-03-10",
            dec!(4),
            dec!(100),
            Decimal::ZERO,
            Some(dec!(400)),
            "JPY",
            2,
        ),
    ];
    let dividends = vec![
        make_dividend("7203", date(2024, 3, 5), dec!(5), "JPY"),
        make_dividend("7203", date(2024, 3, 15), dec!(5), "JPY"),
        make_dividend("9999", date(2024, 3, 5), dec!(5), "JPY"),
    ];

    let service = DividendService::new(
        Arc::new(MockDividendRepository::new(dividends)),
        Arc::new(MockTransactionRepository::new(transactions)),
        Arc::new(MockFxService::new()),
        Arc::new(RwLock::new("JPY".to_string())),
    );

    let events = service
        .dividend_events(date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();

    // The unheld ticker is dropped; quantities reflect the ledger at each
    // ex-date.
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].quantity_held_at_ex_date, dec!(10));
    assert_eq!(events[0].total_amount, dec!(50));
    assert_eq!(events[1].quantity_held_at_ex_date, dec!(6));
    assert_eq!(events[1].total_amount, dec!(30));
}
