pub mod market_data_constants;
pub mod market_data_errors;
pub mod market_data_model;
pub mod market_data_repository;
pub mod market_data_service;
pub mod market_data_traits;

pub use market_data_constants::*;
pub use market_data_errors::MarketDataError;
pub use market_data_model::{
    DataSource, LatestQuotePair, ProviderDividend, ProviderSplit, Quote, SplitEvent,
};
pub use market_data_repository::MarketDataRepository;
pub use market_data_service::MarketDataService;
pub use market_data_traits::{
    MarketDataProviderTrait, MarketDataRepositoryTrait, MarketDataServiceTrait,
};
