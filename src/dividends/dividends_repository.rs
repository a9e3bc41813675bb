use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::dividends_model::{Dividend, DividendDb};
use super::dividends_traits::DividendRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::dividends;

/// Repository for dividend facts in the database
pub struct DividendRepository {
    pool: Arc<DbPool>,
}

impl DividendRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl DividendRepositoryTrait for DividendRepository {
    fn get_all(&self) -> Result<Vec<Dividend>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = dividends::table
            .order((dividends::ticker.asc(), dividends::ex_date.asc()))
            .select(DividendDb::as_select())
            .load::<DividendDb>(&mut conn)?;

        Ok(rows.into_iter().map(Dividend::from).collect())
    }

    fn get_by_ticker(&self, ticker: &str) -> Result<Vec<Dividend>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = dividends::table
            .filter(dividends::ticker.eq(ticker))
            .order(dividends::ex_date.asc())
            .select(DividendDb::as_select())
            .load::<DividendDb>(&mut conn)?;

        Ok(rows.into_iter().map(Dividend::from).collect())
    }

    fn get_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Dividend>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = dividends::table
            .filter(dividends::ex_date.ge(start))
            .filter(dividends::ex_date.le(end))
            .order(dividends::ex_date.asc())
            .select(DividendDb::as_select())
            .load::<DividendDb>(&mut conn)?;

        Ok(rows.into_iter().map(Dividend::from).collect())
    }

    fn get_for_date(&self, ex_date: NaiveDate) -> Result<Vec<Dividend>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = dividends::table
            .filter(dividends::ex_date.eq(ex_date))
            .order(dividends::ticker.asc())
            .select(DividendDb::as_select())
            .load::<DividendDb>(&mut conn)?;

        Ok(rows.into_iter().map(Dividend::from).collect())
    }

    fn upsert(&self, records: &[Dividend]) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        for dividend in records {
            let row = DividendDb::from(dividend);
            diesel::insert_into(dividends::table)
                .values(&row)
                .on_conflict(dividends::id)
                .do_update()
                .set((
                    dividends::amount_per_share.eq(row.amount_per_share),
                    dividends::currency.eq(row.currency.clone()),
                ))
                .execute(&mut conn)?;
        }
        Ok(())
    }
}
