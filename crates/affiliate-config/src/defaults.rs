//! Default values shared by the configuration loader and the client.

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Smallest commission, in per-mille, the backend accepts by default.
pub const DEFAULT_MIN_COMMISSION_PERMILLE: i32 = 1;

/// Largest commission, in per-mille, the backend accepts by default.
pub const DEFAULT_MAX_COMMISSION_PERMILLE: i32 = 999;

/// Program durations, in months, the backend accepts. Zero means unlimited.
pub const ALLOWED_MONTH_COUNTS: [i32; 7] = [0, 1, 3, 6, 12, 24, 36];

/// Default log filter expression.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}
