use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::benchmarks_model::{BenchmarkQuote, BenchmarkQuoteDb};
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::benchmark_quotes;

pub trait BenchmarkRepositoryTrait: Send + Sync {
    fn get_quotes_in_range(
        &self,
        benchmark_key: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkQuote>>;

    fn get_latest_quote(&self, benchmark_key: &str) -> Result<Option<BenchmarkQuote>>;

    fn upsert_quotes(&self, quotes: &[BenchmarkQuote]) -> Result<()>;
}

/// Repository for benchmark index closes in the database
pub struct BenchmarkRepository {
    pool: Arc<DbPool>,
}

impl BenchmarkRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl BenchmarkRepositoryTrait for BenchmarkRepository {
    fn get_quotes_in_range(
        &self,
        key: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BenchmarkQuote>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = benchmark_quotes::table
            .filter(benchmark_quotes::benchmark_key.eq(key))
            .filter(benchmark_quotes::quote_date.ge(start))
            .filter(benchmark_quotes::quote_date.le(end))
            .order(benchmark_quotes::quote_date.asc())
            .select(BenchmarkQuoteDb::as_select())
            .load::<BenchmarkQuoteDb>(&mut conn)?;

        Ok(rows.into_iter().map(BenchmarkQuote::from).collect())
    }

    fn get_latest_quote(&self, key: &str) -> Result<Option<BenchmarkQuote>> {
        let mut conn = get_connection(&self.pool)?;

        let row = benchmark_quotes::table
            .filter(benchmark_quotes::benchmark_key.eq(key))
            .order(benchmark_quotes::quote_date.desc())
            .select(BenchmarkQuoteDb::as_select())
            .first::<BenchmarkQuoteDb>(&mut conn)
            .optional()?;

        Ok(row.map(BenchmarkQuote::from))
    }

    fn upsert_quotes(&self, quotes: &[BenchmarkQuote]) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        for quote in quotes {
            let row = BenchmarkQuoteDb::from(quote);
            diesel::insert_into(benchmark_quotes::table)
                .values(&row)
                .on_conflict(benchmark_quotes::id)
                .do_update()
                .set(benchmark_quotes::close.eq(row.close))
                .execute(&mut conn)?;
        }
        Ok(())
    }
}
