use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::transactions::transactions_constants::{SIDE_BUY, SIDE_SELL};
use crate::transactions::transactions_errors::TransactionError;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionSide {
    Buy,
    Sell,
}

impl TransactionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSide::Buy => SIDE_BUY,
            TransactionSide::Sell => SIDE_SELL,
        }
    }
}

impl FromStr for TransactionSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SIDE_BUY => Ok(TransactionSide::Buy),
            SIDE_SELL => Ok(TransactionSide::Sell),
            _ => Err(format!("Unknown transaction side: {}", s)),
        }
    }
}

/// Domain model representing one ledger entry.
///
/// Entries are immutable once recorded; corrections are modeled as
/// delete + reinsert followed by a rebuild of the derived state. Replay
/// order is `(transaction_date, sequence)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub ticker: String,
    pub security_name: Option<String>,
    pub side: TransactionSide,
    pub transaction_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub commission: Decimal,
    /// Commission-inclusive cash magnitude in the reporting currency, as
    /// recorded by the broker. The implied FX between this and
    /// `unit_price` is never re-derived.
    pub settlement_amount: Option<Decimal>,
    pub trade_currency: String,
    pub sequence: i64,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Commission-inclusive acquisition cost of a BUY.
    pub fn effective_cost(&self) -> Decimal {
        self.settlement_amount
            .unwrap_or_else(|| self.quantity * self.unit_price + self.commission)
    }

    /// Commission-inclusive proceeds of a SELL.
    pub fn effective_proceeds(&self) -> Decimal {
        self.settlement_amount
            .unwrap_or_else(|| self.quantity * self.unit_price - self.commission)
    }
}

/// Database model for ledger entries
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct TransactionDb {
    pub id: String,
    pub ticker: String,
    pub security_name: Option<String>,
    pub side: String,
    pub transaction_date: NaiveDate,
    pub quantity: f64,
    pub unit_price: f64,
    pub commission: f64,
    pub settlement_amount: Option<f64>,
    pub trade_currency: String,
    pub sequence: i64,
    pub created_at: NaiveDateTime,
}

impl From<TransactionDb> for Transaction {
    fn from(db: TransactionDb) -> Self {
        Self {
            id: db.id,
            ticker: db.ticker,
            security_name: db.security_name,
            side: TransactionSide::from_str(&db.side).unwrap_or(TransactionSide::Buy),
            transaction_date: db.transaction_date,
            quantity: Decimal::from_f64(db.quantity).unwrap_or_default(),
            unit_price: Decimal::from_f64(db.unit_price).unwrap_or_default(),
            commission: Decimal::from_f64(db.commission).unwrap_or_default(),
            settlement_amount: db.settlement_amount.and_then(Decimal::from_f64),
            trade_currency: db.trade_currency,
            sequence: db.sequence,
            created_at: db.created_at,
        }
    }
}

impl From<&Transaction> for TransactionDb {
    fn from(domain: &Transaction) -> Self {
        Self {
            id: domain.id.clone(),
            ticker: domain.ticker.clone(),
            security_name: domain.security_name.clone(),
            side: domain.side.as_str().to_string(),
            transaction_date: domain.transaction_date,
            quantity: domain.quantity.to_f64().unwrap_or_default(),
            unit_price: domain.unit_price.to_f64().unwrap_or_default(),
            commission: domain.commission.to_f64().unwrap_or_default(),
            settlement_amount: domain.settlement_amount.and_then(|d| d.to_f64()),
            trade_currency: domain.trade_currency.clone(),
            sequence: domain.sequence,
            created_at: domain.created_at,
        }
    }
}

/// Input model for recording a new ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub id: Option<String>,
    pub ticker: String,
    pub security_name: Option<String>,
    pub side: String,
    pub transaction_date: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub commission: f64,
    pub settlement_amount: Option<f64>,
    pub trade_currency: String,
}

impl NewTransaction {
    /// Validates the entry before it touches any state.
    pub fn validate(&self) -> crate::transactions::Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Ticker cannot be empty".to_string(),
            ));
        }
        if TransactionSide::from_str(&self.side).is_err() {
            return Err(TransactionError::InvalidData(format!(
                "Unknown transaction side: {}",
                self.side
            )));
        }
        if NaiveDate::parse_from_str(&self.transaction_date, "%Y-%m-%d").is_err() {
            return Err(TransactionError::InvalidData(
                "Invalid date format. Expected YYYY-MM-DD".to_string(),
            ));
        }
        if self.quantity <= 0.0 {
            return Err(TransactionError::InvalidData(
                "Quantity must be positive".to_string(),
            ));
        }
        if self.unit_price <= 0.0 {
            return Err(TransactionError::InvalidData(
                "Unit price must be positive".to_string(),
            ));
        }
        if self.commission < 0.0 {
            return Err(TransactionError::InvalidData(
                "Commission cannot be negative".to_string(),
            ));
        }
        if let Some(settlement) = self.settlement_amount {
            if settlement < 0.0 {
                return Err(TransactionError::InvalidData(
                    "Settlement amount cannot be negative".to_string(),
                ));
            }
        }
        if self.trade_currency.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Trade currency cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn parsed_date(&self) -> crate::transactions::Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.transaction_date, "%Y-%m-%d").map_err(|e| {
            TransactionError::InvalidData(format!(
                "Failed to parse date '{}': {}",
                self.transaction_date, e
            ))
        })
    }
}

/// Per-row failure collected while importing a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportError {
    pub ticker: String,
    pub transaction_date: String,
    pub message: String,
}

/// Outcome of a batch import
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub saved: usize,
    pub failed: usize,
    pub errors: Vec<ImportError>,
}
