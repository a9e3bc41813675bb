use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for position-accounting operations
#[derive(Debug, Error)]
pub enum AccountingError {
    #[error("Insufficient position for {ticker}: tried to sell {requested} with {held} held")]
    InsufficientPosition {
        ticker: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DieselError> for AccountingError {
    fn from(err: DieselError) -> Self {
        AccountingError::DatabaseError(err.to_string())
    }
}

impl From<r2d2::Error> for AccountingError {
    fn from(err: r2d2::Error) -> Self {
        AccountingError::DatabaseError(err.to_string())
    }
}
