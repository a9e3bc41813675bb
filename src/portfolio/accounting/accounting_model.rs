use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current holding of one ticker, derived from the ledger.
///
/// A position with zero quantity is never materialized; it is deleted.
/// Invariant: `total_cost == average_cost * quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub ticker: String,
    pub security_name: Option<String>,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub total_cost: Decimal,
    pub currency: String,
    pub updated_at: NaiveDateTime,
}

impl Position {
    pub fn open(
        ticker: &str,
        security_name: Option<String>,
        quantity: Decimal,
        total_cost: Decimal,
        currency: &str,
    ) -> Self {
        Self {
            ticker: ticker.to_string(),
            security_name,
            quantity,
            average_cost: total_cost / quantity,
            total_cost,
            currency: currency.to_string(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    /// Folds a commission-inclusive acquisition into the moving average.
    pub fn absorb_buy(&mut self, quantity: Decimal, cost: Decimal) {
        self.total_cost += cost;
        self.quantity += quantity;
        self.average_cost = self.total_cost / self.quantity;
        self.updated_at = Utc::now().naive_utc();
    }

    /// Removes `quantity` units at the carried average cost and returns the
    /// cost basis released. The average cost of the remaining units does not
    /// change; that is the moving-average property.
    pub fn release(&mut self, quantity: Decimal) -> Decimal {
        let cost_basis_removed = self.average_cost * quantity;
        self.quantity -= quantity;
        self.total_cost = self.quantity * self.average_cost;
        self.updated_at = Utc::now().naive_utc();
        cost_basis_removed
    }
}

/// Database model for positions
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(primary_key(ticker))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDb {
    pub ticker: String,
    pub security_name: Option<String>,
    pub quantity: f64,
    pub average_cost: f64,
    pub total_cost: f64,
    pub currency: String,
    pub updated_at: NaiveDateTime,
}

impl From<PositionDb> for Position {
    fn from(db: PositionDb) -> Self {
        Self {
            ticker: db.ticker,
            security_name: db.security_name,
            quantity: Decimal::from_f64(db.quantity).unwrap_or_default(),
            average_cost: Decimal::from_f64(db.average_cost).unwrap_or_default(),
            total_cost: Decimal::from_f64(db.total_cost).unwrap_or_default(),
            currency: db.currency,
            updated_at: db.updated_at,
        }
    }
}

impl From<&Position> for PositionDb {
    fn from(domain: &Position) -> Self {
        Self {
            ticker: domain.ticker.clone(),
            security_name: domain.security_name.clone(),
            quantity: domain.quantity.to_f64().unwrap_or_default(),
            average_cost: domain.average_cost.to_f64().unwrap_or_default(),
            total_cost: domain.total_cost.to_f64().unwrap_or_default(),
            currency: domain.currency.clone(),
            updated_at: domain.updated_at,
        }
    }
}

/// Profit locked in by one SELL, computed against the average cost carried
/// at the time of the sale. Append-only; keyed by the sell transaction so a
/// rebuild reproduces identical rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedGain {
    pub id: String,
    pub ticker: String,
    pub sell_date: NaiveDate,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub sell_price: Decimal,
    pub realized_pnl: Decimal,
    pub realized_pnl_pct: Option<Decimal>,
    pub commission: Decimal,
    pub currency: String,
    pub created_at: NaiveDateTime,
}

/// Database model for realized gains
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::realized_gains)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RealizedGainDb {
    pub id: String,
    pub ticker: String,
    pub sell_date: NaiveDate,
    pub quantity: f64,
    pub average_cost: f64,
    pub sell_price: f64,
    pub realized_pnl: f64,
    pub realized_pnl_pct: Option<f64>,
    pub commission: f64,
    pub currency: String,
    pub created_at: NaiveDateTime,
}

impl From<RealizedGainDb> for RealizedGain {
    fn from(db: RealizedGainDb) -> Self {
        Self {
            id: db.id,
            ticker: db.ticker,
            sell_date: db.sell_date,
            quantity: Decimal::from_f64(db.quantity).unwrap_or_default(),
            average_cost: Decimal::from_f64(db.average_cost).unwrap_or_default(),
            sell_price: Decimal::from_f64(db.sell_price).unwrap_or_default(),
            realized_pnl: Decimal::from_f64(db.realized_pnl).unwrap_or_default(),
            realized_pnl_pct: db.realized_pnl_pct.and_then(Decimal::from_f64),
            commission: Decimal::from_f64(db.commission).unwrap_or_default(),
            currency: db.currency,
            created_at: db.created_at,
        }
    }
}

impl From<&RealizedGain> for RealizedGainDb {
    fn from(domain: &RealizedGain) -> Self {
        Self {
            id: domain.id.clone(),
            ticker: domain.ticker.clone(),
            sell_date: domain.sell_date,
            quantity: domain.quantity.to_f64().unwrap_or_default(),
            average_cost: domain.average_cost.to_f64().unwrap_or_default(),
            sell_price: domain.sell_price.to_f64().unwrap_or_default(),
            realized_pnl: domain.realized_pnl.to_f64().unwrap_or_default(),
            realized_pnl_pct: domain.realized_pnl_pct.and_then(|d| d.to_f64()),
            commission: domain.commission.to_f64().unwrap_or_default(),
            currency: domain.currency.clone(),
            created_at: domain.created_at,
        }
    }
}

/// Result of replaying one ticker's ledger.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub position: Option<Position>,
    pub realized_gains: Vec<RealizedGain>,
}

/// Per-ticker aggregate over the realized-gain history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealizedGainSummary {
    pub ticker: String,
    pub currency: String,
    pub sell_count: usize,
    pub total_quantity: Decimal,
    pub total_realized_pnl: Decimal,
}

/// Position enriched with market data for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub ticker: String,
    pub security_name: Option<String>,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub total_cost: Decimal,
    pub currency: String,
    pub current_price: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub day_change_pct: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub unrealized_pnl_pct: Option<Decimal>,
    pub market_value_base: Option<Decimal>,
}
