use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain model for an externally sourced dividend fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: String,
    pub ticker: String,
    pub ex_date: NaiveDate,
    pub amount_per_share: Decimal,
    pub currency: String,
    pub created_at: NaiveDateTime,
}

impl Dividend {
    pub fn new(ticker: &str, ex_date: NaiveDate, amount_per_share: Decimal, currency: &str) -> Self {
        Self {
            id: format!("{}_{}", ticker, ex_date.format("%Y%m%d")),
            ticker: ticker.to_string(),
            ex_date,
            amount_per_share,
            currency: currency.to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Database model for dividends
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::dividends)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DividendDb {
    pub id: String,
    pub ticker: String,
    pub ex_date: NaiveDate,
    pub amount_per_share: f64,
    pub currency: String,
    pub created_at: NaiveDateTime,
}

impl From<DividendDb> for Dividend {
    fn from(db: DividendDb) -> Self {
        Self {
            id: db.id,
            ticker: db.ticker,
            ex_date: db.ex_date,
            amount_per_share: Decimal::from_f64(db.amount_per_share).unwrap_or_default(),
            currency: db.currency,
            created_at: db.created_at,
        }
    }
}

impl From<&Dividend> for DividendDb {
    fn from(domain: &Dividend) -> Self {
        Self {
            id: domain.id.clone(),
            ticker: domain.ticker.clone(),
            ex_date: domain.ex_date,
            amount_per_share: domain.amount_per_share.to_f64().unwrap_or_default(),
            currency: domain.currency.clone(),
            created_at: domain.created_at,
        }
    }
}

/// A dividend fact joined with the quantity the portfolio actually held on
/// the ex-date (inclusive), as replayed from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendEvent {
    pub ticker: String,
    pub ex_date: NaiveDate,
    pub amount_per_share: Decimal,
    pub currency: String,
    pub quantity_held_at_ex_date: Decimal,
    pub total_amount: Decimal,
}

/// Per-ticker dividend income aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendIncomeSummary {
    pub ticker: String,
    pub currency: String,
    pub event_count: usize,
    pub total_amount: Decimal,
    pub total_amount_base: Decimal,
}
