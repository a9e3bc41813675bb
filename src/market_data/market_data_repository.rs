use chrono::NaiveDate;
use diesel::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use super::market_data_errors::MarketDataError;
use super::market_data_model::{LatestQuotePair, Quote, QuoteDb, SplitEvent, SplitEventDb};
use super::market_data_traits::{MarketDataRepositoryTrait, RepositoryResult};
use crate::db::{get_connection, DbPool};
use crate::schema::{quotes, splits};

/// Repository for quote and split data in the database
pub struct MarketDataRepository {
    pool: Arc<DbPool>,
}

impl MarketDataRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl MarketDataRepositoryTrait for MarketDataRepository {
    fn get_quote(&self, symbol: &str, date: NaiveDate) -> RepositoryResult<Option<Quote>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        quotes::table
            .filter(quotes::symbol.eq(symbol))
            .filter(quotes::quote_date.eq(date))
            .select(QuoteDb::as_select())
            .first::<QuoteDb>(&mut conn)
            .optional()
            .map(|row| row.map(Quote::from))
            .map_err(MarketDataError::from)
    }

    fn get_quotes_in_range(
        &self,
        symbols: &HashSet<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Quote>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        let symbol_list: Vec<&String> = symbols.iter().collect();
        quotes::table
            .filter(quotes::symbol.eq_any(symbol_list))
            .filter(quotes::quote_date.ge(start))
            .filter(quotes::quote_date.le(end))
            .order((quotes::symbol.asc(), quotes::quote_date.asc()))
            .select(QuoteDb::as_select())
            .load::<QuoteDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Quote::from).collect())
            .map_err(MarketDataError::from)
    }

    fn get_latest_quote(&self, symbol: &str) -> RepositoryResult<Option<Quote>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        quotes::table
            .filter(quotes::symbol.eq(symbol))
            .order(quotes::quote_date.desc())
            .select(QuoteDb::as_select())
            .first::<QuoteDb>(&mut conn)
            .optional()
            .map(|row| row.map(Quote::from))
            .map_err(MarketDataError::from)
    }

    fn get_latest_quote_pair(&self, symbol: &str) -> RepositoryResult<Option<LatestQuotePair>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        let mut rows: Vec<QuoteDb> = quotes::table
            .filter(quotes::symbol.eq(symbol))
            .order(quotes::quote_date.desc())
            .limit(2)
            .select(QuoteDb::as_select())
            .load::<QuoteDb>(&mut conn)
            .map_err(MarketDataError::from)?;

        if rows.is_empty() {
            return Ok(None);
        }

        let latest = Quote::from(rows.remove(0));
        let previous = rows.pop().map(Quote::from);
        Ok(Some(LatestQuotePair { latest, previous }))
    }

    fn distinct_quote_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<NaiveDate>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        quotes::table
            .filter(quotes::quote_date.ge(start))
            .filter(quotes::quote_date.le(end))
            .select(quotes::quote_date)
            .distinct()
            .order(quotes::quote_date.asc())
            .load::<NaiveDate>(&mut conn)
            .map_err(MarketDataError::from)
    }

    fn upsert_quotes(&self, new_quotes: &[Quote]) -> RepositoryResult<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        for quote in new_quotes {
            let row = QuoteDb::from(quote);
            diesel::insert_into(quotes::table)
                .values(&row)
                .on_conflict(quotes::id)
                .do_update()
                .set((
                    quotes::close.eq(row.close),
                    quotes::currency.eq(row.currency.clone()),
                    quotes::data_source.eq(row.data_source.clone()),
                ))
                .execute(&mut conn)
                .map_err(MarketDataError::from)?;
        }
        Ok(())
    }

    fn get_splits_in_window(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<SplitEvent>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        splits::table
            .filter(splits::ticker.eq(ticker))
            .filter(splits::split_date.gt(from))
            .filter(splits::split_date.le(to))
            .order(splits::split_date.asc())
            .select(SplitEventDb::as_select())
            .load::<SplitEventDb>(&mut conn)
            .map(|rows| rows.into_iter().map(SplitEvent::from).collect())
            .map_err(MarketDataError::from)
    }

    fn upsert_splits(&self, events: &[SplitEvent]) -> RepositoryResult<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| MarketDataError::DatabaseError(e.to_string()))?;

        for event in events {
            let row = SplitEventDb::from(event);
            diesel::insert_into(splits::table)
                .values(&row)
                .on_conflict(splits::id)
                .do_update()
                .set(splits::ratio.eq(row.ratio))
                .execute(&mut conn)
                .map_err(MarketDataError::from)?;
        }
        Ok(())
    }
}
