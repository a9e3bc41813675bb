pub mod returns_model;
pub mod returns_service;
pub mod xirr;

pub use returns_model::CashFlow;
pub use returns_service::{ReturnsService, ReturnsServiceTrait};
