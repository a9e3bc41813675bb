use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Static description of a tracked benchmark index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkInfo {
    pub key: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub currency: &'static str,
}

/// Domain model for a benchmark index close
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkQuote {
    pub id: String,
    pub benchmark_key: String,
    pub symbol: String,
    pub date: NaiveDate,
    pub close: Decimal,
    pub currency: String,
    pub created_at: NaiveDateTime,
}

impl BenchmarkQuote {
    pub fn new(
        benchmark_key: &str,
        symbol: &str,
        date: NaiveDate,
        close: Decimal,
        currency: &str,
    ) -> Self {
        Self {
            id: format!("{}_{}", benchmark_key, date.format("%Y%m%d")),
            benchmark_key: benchmark_key.to_string(),
            symbol: symbol.to_string(),
            date,
            close,
            currency: currency.to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Database model for benchmark quotes
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::benchmark_quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BenchmarkQuoteDb {
    pub id: String,
    pub benchmark_key: String,
    pub symbol: String,
    pub quote_date: NaiveDate,
    pub close: f64,
    pub currency: String,
    pub created_at: NaiveDateTime,
}

impl From<BenchmarkQuoteDb> for BenchmarkQuote {
    fn from(db: BenchmarkQuoteDb) -> Self {
        Self {
            id: db.id,
            benchmark_key: db.benchmark_key,
            symbol: db.symbol,
            date: db.quote_date,
            close: Decimal::from_f64(db.close).unwrap_or_default(),
            currency: db.currency,
            created_at: db.created_at,
        }
    }
}

impl From<&BenchmarkQuote> for BenchmarkQuoteDb {
    fn from(domain: &BenchmarkQuote) -> Self {
        Self {
            id: domain.id.clone(),
            benchmark_key: domain.benchmark_key.clone(),
            symbol: domain.symbol.clone(),
            quote_date: domain.date,
            close: domain.close.to_f64().unwrap_or_default(),
            currency: domain.currency.clone(),
            created_at: domain.created_at,
        }
    }
}
