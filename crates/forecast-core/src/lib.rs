//! Forecast Core
//!
//! Shared foundation of the demand/capacity forecast engine:
//! - Input records from the data-access layer and their normalized forms
//! - Recurrence to monthly hours calculation
//! - Month axis enumeration
//! - Matrix value types and filter configuration
//!
//! # Example
//!
//! ```rust
//! use forecast_core::{MonthInfo, RecurrenceCalculator, RecurringTask, TaskRecord};
//!
//! let record = TaskRecord {
//!     id: "t1".to_string(),
//!     client_id: "c1".to_string(),
//!     estimated_hours: Some(10.0),
//!     recurrence_type: Some("Weekly".to_string()),
//!     ..TaskRecord::default()
//! };
//! let task = RecurringTask::from_record(&record);
//! let month = MonthInfo::from_key("2025-01").unwrap();
//!
//! let hours = RecurrenceCalculator::new().monthly_hours(&task, &month);
//! assert!((hours.hours - 43.3).abs() < 1e-9);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod month;
pub mod records;
pub mod recurrence;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use month::{DateRange, MonthInfo};
pub use records::{
    ingest_staff, ingest_tasks, normalize_reference, normalize_skill, ClientRecord,
    RecurringTask, StaffCapacity, StaffCapacityRecord, TaskRecord,
};
pub use recurrence::{
    MonthlyHours, RecurrenceCalculator, RecurrenceIssue, RecurrencePattern, RecurrenceType,
    DAYS_PER_MONTH, WEEKS_PER_MONTH,
};
pub use types::{
    CapacityDataPoint, CapacityMatrix, ClientTaskDemand, DemandDataPoint, FilterConfig, GapCell,
    MatrixData, MonthRange, PreferredStaffFilterMode, SkillSummary, StaffCapacityShare,
};

/// Tolerance for comparing aggregated hours
pub const HOURS_TOLERANCE: f64 = 1e-6;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with forecast data
    pub use crate::{
        ClientRecord, DateRange, DemandDataPoint, FilterConfig, MatrixData, MonthInfo,
        PreferredStaffFilterMode, RecurrenceCalculator, StaffCapacityRecord, TaskRecord,
    };
}
