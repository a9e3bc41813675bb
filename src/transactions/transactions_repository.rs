use chrono::{NaiveDate, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use super::transactions_errors::{Result, TransactionError};
use super::transactions_model::{NewTransaction, Transaction, TransactionDb};
use crate::db::{get_connection, DbPool};
use crate::schema::transactions;

/// Repository for ledger entries in the database
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl super::transactions_traits::TransactionRepositoryTrait for TransactionRepository {
    fn get_all(&self) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions::table
            .order((
                transactions::transaction_date.asc(),
                transactions::sequence.asc(),
            ))
            .select(TransactionDb::as_select())
            .load::<TransactionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(TransactionError::from)
    }

    fn get_by_ticker(&self, ticker: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions::table
            .filter(transactions::ticker.eq(ticker))
            .order((
                transactions::transaction_date.asc(),
                transactions::sequence.asc(),
            ))
            .select(TransactionDb::as_select())
            .load::<TransactionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(TransactionError::from)
    }

    fn get_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions::table
            .filter(transactions::transaction_date.ge(start))
            .filter(transactions::transaction_date.le(end))
            .order((
                transactions::transaction_date.asc(),
                transactions::sequence.asc(),
            ))
            .select(TransactionDb::as_select())
            .load::<TransactionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(TransactionError::from)
    }

    fn insert(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;
        let transaction_date = new_transaction.parsed_date()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let next_sequence: i64 = transactions::table
            .select(max(transactions::sequence))
            .first::<Option<i64>>(&mut conn)
            .map_err(TransactionError::from)?
            .unwrap_or(0)
            + 1;

        let row = TransactionDb {
            id: new_transaction
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            ticker: new_transaction.ticker,
            security_name: new_transaction.security_name,
            side: new_transaction.side,
            transaction_date,
            quantity: new_transaction.quantity,
            unit_price: new_transaction.unit_price,
            commission: new_transaction.commission,
            settlement_amount: new_transaction.settlement_amount,
            trade_currency: new_transaction.trade_currency,
            sequence: next_sequence,
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(transactions::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(TransactionError::from)?;

        Ok(Transaction::from(row))
    }

    fn delete(&self, ids: &[String]) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let affected: Vec<String> = transactions::table
            .filter(transactions::id.eq_any(ids))
            .select(transactions::ticker)
            .distinct()
            .load::<String>(&mut conn)
            .map_err(TransactionError::from)?;

        diesel::delete(transactions::table.filter(transactions::id.eq_any(ids)))
            .execute(&mut conn)
            .map_err(TransactionError::from)?;

        Ok(affected)
    }

    fn exists_duplicate(
        &self,
        transaction_date: NaiveDate,
        ticker: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<bool> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let count: i64 = transactions::table
            .filter(transactions::transaction_date.eq(transaction_date))
            .filter(transactions::ticker.eq(ticker))
            .filter(transactions::quantity.eq(quantity))
            .filter(transactions::unit_price.eq(unit_price))
            .count()
            .get_result(&mut conn)
            .map_err(TransactionError::from)?;

        Ok(count > 0)
    }

    fn distinct_tickers(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions::table
            .select(transactions::ticker)
            .distinct()
            .order(transactions::ticker.asc())
            .load::<String>(&mut conn)
            .map_err(TransactionError::from)
    }

    fn first_transaction_date(&self) -> Result<Option<NaiveDate>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        transactions::table
            .select(diesel::dsl::min(transactions::transaction_date))
            .first::<Option<NaiveDate>>(&mut conn)
            .map_err(TransactionError::from)
    }
}
