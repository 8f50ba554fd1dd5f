//! Error types for matrix construction
//!
//! Only contract violations are errors. Bad records degrade to zero hours.

use forecast_core::CoreError;

/// Errors during matrix construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// Invalid input from the caller (date range, month keys)
    #[error("invalid input: {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for matrix operations
pub type MatrixResult<T> = Result<T, MatrixError>;
