use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::fx_errors::FxError;
use super::fx_model::{ExchangeRate, ExchangeRateDb};
use super::fx_traits::{FxRepositoryTrait, Result};
use crate::db::{get_connection, DbPool};
use crate::schema::fx_rates;

/// Repository for exchange rate facts in the database
pub struct FxRepository {
    pool: Arc<DbPool>,
}

impl FxRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl FxRepositoryTrait for FxRepository {
    fn get_rate_on_or_before(
        &self,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| FxError::DatabaseError(e.to_string()))?;

        fx_rates::table
            .filter(fx_rates::from_currency.eq(from))
            .filter(fx_rates::to_currency.eq(to))
            .filter(fx_rates::rate_date.le(date))
            .order(fx_rates::rate_date.desc())
            .select(ExchangeRateDb::as_select())
            .first::<ExchangeRateDb>(&mut conn)
            .optional()
            .map(|row| row.map(ExchangeRate::from))
            .map_err(FxError::from)
    }

    fn get_latest_rate(&self, from: &str, to: &str) -> Result<Option<ExchangeRate>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| FxError::DatabaseError(e.to_string()))?;

        fx_rates::table
            .filter(fx_rates::from_currency.eq(from))
            .filter(fx_rates::to_currency.eq(to))
            .order(fx_rates::rate_date.desc())
            .select(ExchangeRateDb::as_select())
            .first::<ExchangeRateDb>(&mut conn)
            .optional()
            .map(|row| row.map(ExchangeRate::from))
            .map_err(FxError::from)
    }

    fn get_rates_in_range(
        &self,
        from: &str,
        to: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExchangeRate>> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| FxError::DatabaseError(e.to_string()))?;

        fx_rates::table
            .filter(fx_rates::from_currency.eq(from))
            .filter(fx_rates::to_currency.eq(to))
            .filter(fx_rates::rate_date.ge(start))
            .filter(fx_rates::rate_date.le(end))
            .order(fx_rates::rate_date.asc())
            .select(ExchangeRateDb::as_select())
            .load::<ExchangeRateDb>(&mut conn)
            .map(|rows| rows.into_iter().map(ExchangeRate::from).collect())
            .map_err(FxError::from)
    }

    fn save_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| FxError::DatabaseError(e.to_string()))?;

        let row = ExchangeRateDb::from(&rate);
        diesel::insert_into(fx_rates::table)
            .values(&row)
            .on_conflict(fx_rates::id)
            .do_update()
            .set((
                fx_rates::rate.eq(row.rate),
                fx_rates::source.eq(row.source.clone()),
            ))
            .execute(&mut conn)
            .map_err(FxError::from)?;

        Ok(rate)
    }

    fn delete_rate(&self, rate_id: &str) -> Result<()> {
        let mut conn =
            get_connection(&self.pool).map_err(|e| FxError::DatabaseError(e.to_string()))?;

        diesel::delete(fx_rates::table.filter(fx_rates::id.eq(rate_id)))
            .execute(&mut conn)
            .map_err(FxError::from)?;
        Ok(())
    }
}
