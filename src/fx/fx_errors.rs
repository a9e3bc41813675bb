use thiserror::Error;

#[derive(Debug, Error)]
pub enum FxError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),

    #[error("Invalid currency pair: {0}")]
    InvalidCurrencyPair(String),
}

impl From<diesel::result::Error> for FxError {
    fn from(err: diesel::result::Error) -> Self {
        FxError::DatabaseError(err.to_string())
    }
}

impl From<r2d2::Error> for FxError {
    fn from(err: r2d2::Error) -> Self {
        FxError::DatabaseError(err.to_string())
    }
}
