pub mod performance_model;
pub mod performance_service;

pub use performance_model::{
    BenchmarkPoint, DailyDetail, DividendIncomeDetail, Granularity, HoldingPnlDetail,
    MonthlyDetail, PeriodPnl, RealizedPnlDetail,
};
pub use performance_service::{PerformanceService, PerformanceServiceTrait};
