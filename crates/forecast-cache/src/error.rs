//! Error types for the result cache

/// Cache errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Predicate invalidation was rejected by the backing cache
    #[error("cannot invalidate keys with prefix '{prefix}': {reason}")]
    Invalidation { prefix: String, reason: String },

    /// A key holds a value of another type
    #[error("cache entry '{0}' holds a value of a different type")]
    TypeMismatch(String),
}

impl CacheError {
    /// Create invalidation error for prefix
    pub fn invalidation(prefix: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalidation {
            prefix: prefix.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;
