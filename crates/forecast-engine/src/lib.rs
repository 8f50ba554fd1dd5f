//! Forecast Engine
//!
//! Ties the forecast crates together behind one async entry point:
//! - [`ForecastDataSource`]: where records come from
//! - [`ForecastEngine`]: cached demand, capacity, filtering and gap reports
//! - [`EngineConfig`]: horizon, cache and validation settings, TOML loadable
//! - [`telemetry`]: tracing subscriber setup
//!
//! # Example
//!
//! ```rust
//! use forecast_core::{DateRange, FilterConfig, MonthInfo};
//! use forecast_engine::{EngineConfig, ForecastEngine, InMemorySource};
//! use std::sync::Arc;
//!
//! # futures::executor::block_on(async {
//! let source = Arc::new(InMemorySource::default());
//! let engine = ForecastEngine::new(source, EngineConfig::default());
//! let range = DateRange::months_from(MonthInfo::first_day("2025-01").unwrap(), 12);
//!
//! let report = engine.forecast(&range, &FilterConfig::new()).await.unwrap();
//! assert_eq!(report.demand.months.len(), 12);
//! # });
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod engine;
pub mod error;
pub mod source;
pub mod telemetry;

pub use config::{CacheConfig, EngineConfig};
pub use engine::{ForecastEngine, ForecastReport};
pub use error::{ConfigError, EngineError, EngineResult, SourceError};
pub use source::{ForecastDataSource, InMemorySource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Engine entry points
    pub use crate::{
        EngineConfig, EngineError, ForecastDataSource, ForecastEngine, ForecastReport,
    };
}
