//! Engine configuration
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! horizon_months = 18
//!
//! [cache]
//! ttl_secs = 300
//! ```

use crate::error::ConfigError;
use forecast_cache::{DEFAULT_MAX_CAPACITY, DEFAULT_TTL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Months forecast when no range is given
    pub horizon_months: u32,
    /// Result cache settings
    pub cache: CacheConfig,
    /// Validate records and matrices as they are built
    pub validate_results: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With forecast horizon
    #[inline]
    #[must_use]
    pub fn with_horizon_months(mut self, months: u32) -> Self {
        self.horizon_months = months;
        self
    }

    /// With default cache TTL
    #[inline]
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl_secs = ttl.as_secs();
        self
    }

    /// With maximum cached entries
    #[inline]
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.cache.max_capacity = max_capacity;
        self
    }

    /// With or without build-time validation
    #[inline]
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_results = enabled;
        self
    }

    /// Parse and check a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.horizon_months == 0 {
            return Err(ConfigError::invalid("horizon_months must be at least 1"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::invalid("cache.ttl_secs must be at least 1"));
        }
        if self.cache.max_capacity == 0 {
            return Err(ConfigError::invalid("cache.max_capacity must be at least 1"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_months: 12,
            cache: CacheConfig::default(),
            validate_results: true,
        }
    }
}

/// Result cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Default entry lifetime in seconds
    pub ttl_secs: u64,
    /// Maximum number of cached entries
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Default entry lifetime
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL.as_secs(),
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}
