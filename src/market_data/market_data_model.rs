use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::market_data_constants::{DATA_SOURCE_MANUAL, DATA_SOURCE_YAHOO};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataSource {
    Yahoo,
    Manual,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Yahoo => DATA_SOURCE_YAHOO,
            DataSource::Manual => DATA_SOURCE_MANUAL,
        }
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            DATA_SOURCE_YAHOO => Ok(DataSource::Yahoo),
            DATA_SOURCE_MANUAL => Ok(DataSource::Manual),
            _ => Err(format!("Unknown data source: {}", s)),
        }
    }
}

/// Domain model representing a daily closing quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub symbol: String,
    pub date: NaiveDate,
    pub close: Decimal,
    pub currency: String,
    pub data_source: DataSource,
    pub created_at: NaiveDateTime,
}

impl Quote {
    pub fn new(
        symbol: &str,
        date: NaiveDate,
        close: Decimal,
        currency: &str,
        data_source: DataSource,
    ) -> Self {
        Self {
            id: format!("{}_{}", date.format("%Y%m%d"), symbol),
            symbol: symbol.to_string(),
            date,
            close,
            currency: currency.to_string(),
            data_source,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Database model for quotes
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuoteDb {
    pub id: String,
    pub symbol: String,
    pub quote_date: NaiveDate,
    pub close: f64,
    pub currency: String,
    pub data_source: String,
    pub created_at: NaiveDateTime,
}

impl From<QuoteDb> for Quote {
    fn from(db: QuoteDb) -> Self {
        Self {
            id: db.id,
            symbol: db.symbol,
            date: db.quote_date,
            close: Decimal::from_f64(db.close).unwrap_or_default(),
            currency: db.currency,
            data_source: DataSource::from_str(&db.data_source).unwrap_or(DataSource::Manual),
            created_at: db.created_at,
        }
    }
}

impl From<&Quote> for QuoteDb {
    fn from(domain: &Quote) -> Self {
        Self {
            id: domain.id.clone(),
            symbol: domain.symbol.clone(),
            quote_date: domain.date,
            close: domain.close.to_f64().unwrap_or_default(),
            currency: domain.currency.clone(),
            data_source: domain.data_source.as_str().to_string(),
            created_at: domain.created_at,
        }
    }
}

/// Latest close together with the close of the preceding trading day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestQuotePair {
    pub latest: Quote,
    pub previous: Option<Quote>,
}

/// Stock split event; `ratio` is the price multiplier that makes a close
/// recorded before the split comparable to the retroactively adjusted
/// series (a 2-for-1 split stores 0.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitEvent {
    pub id: String,
    pub ticker: String,
    pub split_date: NaiveDate,
    pub ratio: Decimal,
    pub created_at: NaiveDateTime,
}

impl SplitEvent {
    pub fn new(ticker: &str, split_date: NaiveDate, ratio: Decimal) -> Self {
        Self {
            id: format!("{}_{}", ticker, split_date.format("%Y%m%d")),
            ticker: ticker.to_string(),
            split_date,
            ratio,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Database model for split events
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::splits)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SplitEventDb {
    pub id: String,
    pub ticker: String,
    pub split_date: NaiveDate,
    pub ratio: f64,
    pub created_at: NaiveDateTime,
}

impl From<SplitEventDb> for SplitEvent {
    fn from(db: SplitEventDb) -> Self {
        Self {
            id: db.id,
            ticker: db.ticker,
            split_date: db.split_date,
            ratio: Decimal::from_f64(db.ratio).unwrap_or(Decimal::ONE),
            created_at: db.created_at,
        }
    }
}

impl From<&SplitEvent> for SplitEventDb {
    fn from(domain: &SplitEvent) -> Self {
        Self {
            id: domain.id.clone(),
            ticker: domain.ticker.clone(),
            split_date: domain.split_date,
            ratio: domain.ratio.to_f64().unwrap_or(1.0),
            created_at: domain.created_at,
        }
    }
}

/// Dividend fact as returned by a provider, before it is attached to the
/// local ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDividend {
    pub ex_date: NaiveDate,
    pub amount_per_share: Decimal,
    pub currency: String,
}

/// Split fact as returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSplit {
    pub split_date: NaiveDate,
    pub ratio: Decimal,
}
