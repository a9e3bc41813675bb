pub mod accounting_errors;
pub mod accounting_model;
pub mod accounting_repository;
pub mod accounting_service;
pub mod accounting_traits;
pub mod position_accountant;

pub use accounting_errors::AccountingError;
pub use accounting_model::{
    Position, PositionValuation, RealizedGain, RealizedGainSummary, ReplayOutcome,
};
pub use accounting_repository::PositionRepository;
pub use accounting_service::AccountingService;
pub use accounting_traits::{AccountingServiceTrait, PositionRepositoryTrait};
