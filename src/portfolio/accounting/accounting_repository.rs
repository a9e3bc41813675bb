use chrono::NaiveDate;
use diesel::prelude::*;
use std::sync::Arc;

use super::accounting_errors::AccountingError;
use super::accounting_model::{
    Position, PositionDb, RealizedGain, RealizedGainDb,
};
use super::accounting_traits::{PositionRepositoryTrait, RepositoryResult};
use crate::db::{get_connection, DbPool, DbTransactionExecutor};
use crate::schema::{positions, realized_gains};

/// Repository for the derived position/realized-gain store
pub struct PositionRepository {
    pool: Arc<DbPool>,
}

impl PositionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl PositionRepositoryTrait for PositionRepository {
    fn get_positions(&self) -> RepositoryResult<Vec<Position>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountingError::DatabaseError(e.to_string()))?;

        positions::table
            .order(positions::ticker.asc())
            .select(PositionDb::as_select())
            .load::<PositionDb>(&mut conn)
            .map(|rows| rows.into_iter().map(Position::from).collect())
            .map_err(AccountingError::from)
    }

    fn get_position(&self, ticker: &str) -> RepositoryResult<Option<Position>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountingError::DatabaseError(e.to_string()))?;

        positions::table
            .filter(positions::ticker.eq(ticker))
            .select(PositionDb::as_select())
            .first::<PositionDb>(&mut conn)
            .optional()
            .map(|row| row.map(Position::from))
            .map_err(AccountingError::from)
    }

    fn get_realized_gains(&self) -> RepositoryResult<Vec<RealizedGain>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountingError::DatabaseError(e.to_string()))?;

        realized_gains::table
            .order(realized_gains::sell_date.asc())
            .select(RealizedGainDb::as_select())
            .load::<RealizedGainDb>(&mut conn)
            .map(|rows| rows.into_iter().map(RealizedGain::from).collect())
            .map_err(AccountingError::from)
    }

    fn get_realized_gains_for_ticker(&self, ticker: &str) -> RepositoryResult<Vec<RealizedGain>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountingError::DatabaseError(e.to_string()))?;

        realized_gains::table
            .filter(realized_gains::ticker.eq(ticker))
            .order(realized_gains::sell_date.asc())
            .select(RealizedGainDb::as_select())
            .load::<RealizedGainDb>(&mut conn)
            .map(|rows| rows.into_iter().map(RealizedGain::from).collect())
            .map_err(AccountingError::from)
    }

    fn get_realized_gains_for_date(
        &self,
        sell_date: NaiveDate,
    ) -> RepositoryResult<Vec<RealizedGain>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountingError::DatabaseError(e.to_string()))?;

        realized_gains::table
            .filter(realized_gains::sell_date.eq(sell_date))
            .order(realized_gains::ticker.asc())
            .select(RealizedGainDb::as_select())
            .load::<RealizedGainDb>(&mut conn)
            .map(|rows| rows.into_iter().map(RealizedGain::from).collect())
            .map_err(AccountingError::from)
    }

    fn get_realized_gains_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RealizedGain>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountingError::DatabaseError(e.to_string()))?;

        realized_gains::table
            .filter(realized_gains::sell_date.ge(start))
            .filter(realized_gains::sell_date.le(end))
            .order(realized_gains::sell_date.asc())
            .select(RealizedGainDb::as_select())
            .load::<RealizedGainDb>(&mut conn)
            .map(|rows| rows.into_iter().map(RealizedGain::from).collect())
            .map_err(AccountingError::from)
    }

    fn replace_derived_state(
        &self,
        ticker: &str,
        position: Option<&Position>,
        gains: &[RealizedGain],
    ) -> RepositoryResult<()> {
        self.pool
            .execute(|conn| -> std::result::Result<(), AccountingError> {
                diesel::delete(positions::table.filter(positions::ticker.eq(ticker)))
                    .execute(conn)?;
                diesel::delete(
                    realized_gains::table.filter(realized_gains::ticker.eq(ticker)),
                )
                .execute(conn)?;

                if let Some(position) = position {
                    diesel::insert_into(positions::table)
                        .values(PositionDb::from(position))
                        .execute(conn)?;
                }

                for gain in gains {
                    diesel::insert_into(realized_gains::table)
                        .values(RealizedGainDb::from(gain))
                        .execute(conn)?;
                }

                Ok(())
            })
            .map_err(|e| AccountingError::DatabaseError(e.to_string()))
    }
}
