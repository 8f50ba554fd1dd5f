//! Error types for the forecast engine

use forecast_cache::CacheError;
use forecast_matrix::MatrixError;
use std::path::Path;

/// Errors reported by a [`crate::ForecastDataSource`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Fetching one kind of record failed
    #[error("failed to fetch {entity}: {message}")]
    Fetch { entity: String, message: String },

    /// The source cannot be reached at all
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Create fetch error for an entity
    pub fn fetch(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            entity: entity.into(),
            message: message.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },

    /// Config is not valid TOML for [`crate::EngineConfig`]
    #[error("invalid config: {0}")]
    Parse(String),

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: source.to_string(),
        }
    }

    /// Create out-of-range error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Engine errors
///
/// Cloneable so one failed computation can be handed to every caller
/// waiting on the same cache key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
