use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Domain model for a point-in-time exchange rate fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate_date: NaiveDate,
    pub rate: Decimal,
    pub source: String,
    pub created_at: NaiveDateTime,
}

impl ExchangeRate {
    /// Symbol convention for a currency pair, e.g. `USDJPY=X`.
    pub fn pair_symbol(from: &str, to: &str) -> String {
        format!("{}{}=X", from, to)
    }
}

/// Database model for exchange rates
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::fx_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRateDb {
    pub id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub rate_date: NaiveDate,
    pub rate: f64,
    pub source: String,
    pub created_at: NaiveDateTime,
}

/// Input model for recording a new exchange rate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate_date: NaiveDate,
    pub rate: Decimal,
    pub source: Option<String>,
}

impl From<ExchangeRateDb> for ExchangeRate {
    fn from(db: ExchangeRateDb) -> Self {
        Self {
            id: db.id,
            from_currency: db.from_currency,
            to_currency: db.to_currency,
            rate_date: db.rate_date,
            rate: Decimal::from_f64(db.rate).unwrap_or_default(),
            source: db.source,
            created_at: db.created_at,
        }
    }
}

impl From<&ExchangeRate> for ExchangeRateDb {
    fn from(domain: &ExchangeRate) -> Self {
        Self {
            id: domain.id.clone(),
            from_currency: domain.from_currency.clone(),
            to_currency: domain.to_currency.clone(),
            rate_date: domain.rate_date,
            rate: domain.rate.to_f64().unwrap_or_default(),
            source: domain.source.clone(),
            created_at: domain.created_at,
        }
    }
}

impl From<NewExchangeRate> for ExchangeRate {
    fn from(new_rate: NewExchangeRate) -> Self {
        Self {
            id: format!(
                "{}_{}",
                ExchangeRate::pair_symbol(&new_rate.from_currency, &new_rate.to_currency),
                new_rate.rate_date.format("%Y-%m-%d")
            ),
            from_currency: new_rate.from_currency,
            to_currency: new_rate.to_currency,
            rate_date: new_rate.rate_date,
            rate: new_rate.rate,
            source: new_rate.source.unwrap_or_else(|| "MANUAL".to_string()),
            created_at: Utc::now().naive_utc(),
        }
    }
}
