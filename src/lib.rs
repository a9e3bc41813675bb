pub mod db;

pub mod benchmarks;
pub mod constants;
pub mod dividends;
pub mod errors;
pub mod fx;
pub mod market_data;
pub mod portfolio;
pub mod schema;
pub mod transactions;

pub use errors::{Error, Result};
pub use portfolio::*;
pub use transactions::*;
