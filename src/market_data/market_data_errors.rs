use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<diesel::result::Error> for MarketDataError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => {
                MarketDataError::NotFound("Record not found".to_string())
            }
            _ => MarketDataError::DatabaseError(err.to_string()),
        }
    }
}

impl From<r2d2::Error> for MarketDataError {
    fn from(err: r2d2::Error) -> Self {
        MarketDataError::DatabaseError(err.to_string())
    }
}
