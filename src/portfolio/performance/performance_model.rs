use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Reporting interval of the attribution series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    Daily,
    Monthly,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Granularity::Daily),
            "monthly" => Ok(Granularity::Monthly),
            _ => Err(format!("Unknown granularity: {}", s)),
        }
    }
}

/// One period of the profit-and-loss decomposition, in the base currency.
///
/// `period` is `YYYY-MM-DD` for daily and `YYYY-MM` for monthly series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPnl {
    pub period: String,
    pub holding_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub dividend_income: Decimal,
    pub total: Decimal,
    pub portfolio_value: Decimal,
}

/// Per-ticker contribution to one period's holding P&L.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPnlDetail {
    pub ticker: String,
    pub security_name: Option<String>,
    pub quantity: Decimal,
    pub prev_price: Decimal,
    pub curr_price: Decimal,
    pub price_change: Decimal,
    pub currency: String,
    pub exchange_rate: Decimal,
    pub pnl: Decimal,
}

/// Per-sale contribution to one period's realized P&L.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedPnlDetail {
    pub ticker: String,
    pub security_name: Option<String>,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub sell_price: Decimal,
    pub pnl: Decimal,
}

/// Per-event contribution to one period's dividend income.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendIncomeDetail {
    pub ticker: String,
    pub security_name: Option<String>,
    pub quantity: Decimal,
    pub amount_per_share: Decimal,
    pub currency: String,
    pub exchange_rate: Decimal,
    pub total_amount: Decimal,
}

/// Full per-ticker breakdown of one trading day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDetail {
    pub date: NaiveDate,
    pub holding_details: Vec<HoldingPnlDetail>,
    pub realized_details: Vec<RealizedPnlDetail>,
    pub dividend_details: Vec<DividendIncomeDetail>,
}

impl DailyDetail {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            holding_details: Vec::new(),
            realized_details: Vec::new(),
            dividend_details: Vec::new(),
        }
    }
}

/// Full per-ticker breakdown of one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDetail {
    pub month: String,
    pub holding_details: Vec<HoldingPnlDetail>,
    pub realized_details: Vec<RealizedPnlDetail>,
    pub dividend_details: Vec<DividendIncomeDetail>,
}

impl MonthlyDetail {
    pub fn empty(month: &str) -> Self {
        Self {
            month: month.to_string(),
            holding_details: Vec::new(),
            realized_details: Vec::new(),
            dividend_details: Vec::new(),
        }
    }
}

/// Counterfactual benchmark-tracking point: the P&L the portfolio value
/// would have produced on the benchmark's daily return. Not a trade
/// simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkPoint {
    pub date: NaiveDate,
    pub close: Decimal,
    pub daily_return: Decimal,
    pub virtual_pnl: Decimal,
    pub cumulative_return: Decimal,
}
