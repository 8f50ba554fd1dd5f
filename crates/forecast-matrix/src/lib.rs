//! Forecast Matrix
//!
//! Skill x month matrices built from recurring tasks and staff capacity:
//! - [`MatrixTransformer`]: demand matrix from task, client and staff records
//! - [`fill`]: densify a matrix onto a full skill x month grid
//! - [`MatrixFilterEngine`]: skill, client, preferred staff and month filtering
//! - [`build_capacity`] and [`gap_analysis`]: capacity side and shortages
//!
//! All operations are pure: inputs are borrowed and every result owns its
//! data, so callers may cache and share matrices freely.

#![warn(unreachable_pub)]

pub mod capacity;
pub mod error;
pub mod fill;
pub mod filter;
pub mod gap;
pub mod observer;
pub mod report;
pub mod transformer;

pub use capacity::{align_capacity, build_capacity};
pub use error::{MatrixError, MatrixResult};
pub use fill::fill;
pub use filter::MatrixFilterEngine;
pub use gap::{gap_analysis, shortages};
pub use observer::{MatrixObserver, NoopObserver, TaskIssue, TracingObserver};
pub use report::{ActiveFilters, PerformanceReport};
pub use transformer::{MatrixTransformer, UNKNOWN_CLIENT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Builders and filters
    pub use crate::{
        build_capacity, fill, gap_analysis, MatrixFilterEngine, MatrixTransformer,
        PerformanceReport,
    };
}
