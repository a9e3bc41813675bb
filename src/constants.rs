/// Reporting currency every aggregate is normalized to unless overridden.
pub const DEFAULT_BASE_CURRENCY: &str = "JPY";

/// Decimal places used for user-facing P&L amounts.
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// How far back a quote lookup may pad when a symbol has no close on a
/// given trading day (holidays, suspended listings).
pub const MAX_QUOTE_PAD_DAYS: i64 = 30;

/// Calendar-day buffer prepended to a requested window so the first period
/// always has a previous close (and, for monthly granularity, a prior
/// month-end) to compare against.
pub const PRICE_WINDOW_BUFFER_DAYS: i64 = 45;
