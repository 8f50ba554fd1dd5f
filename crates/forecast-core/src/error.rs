//! Error types for the forecast core
//!
//! Data-quality problems in individual records never surface here; they
//! degrade to zero contribution and are reported as [`crate::RecurrenceIssue`].
//! These errors cover contract violations by the caller.

use chrono::NaiveDate;

/// Errors raised by core model operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Date range ends before it starts
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Month key is not in `YYYY-MM` form
    #[error("invalid month key: '{0}'")]
    InvalidMonthKey(String),
}

impl CoreError {
    /// Create invalid date range error
    pub fn invalid_date_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::InvalidDateRange { start, end }
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
