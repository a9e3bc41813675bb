pub mod dividends_model;
pub mod dividends_repository;
pub mod dividends_service;
pub mod dividends_traits;

pub use dividends_model::{Dividend, DividendEvent, DividendIncomeSummary};
pub use dividends_repository::DividendRepository;
pub use dividends_service::DividendService;
pub use dividends_traits::{DividendRepositoryTrait, DividendServiceTrait};
