use diesel::result::Error as DieselError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransactionError>;

/// Custom error type for ledger operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Duplicate transaction: {0}")]
    Duplicate(String),
}

impl From<DieselError> for TransactionError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => TransactionError::NotFound("Record not found".to_string()),
            _ => TransactionError::DatabaseError(err.to_string()),
        }
    }
}

impl From<TransactionError> for String {
    fn from(error: TransactionError) -> Self {
        error.to_string()
    }
}
