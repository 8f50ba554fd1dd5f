//! Build and filter checkpoints
//!
//! The transformer and filter engine report progress through
//! [`MatrixObserver`] instead of logging directly. [`TracingObserver`]
//! forwards checkpoints to `tracing`; [`NoopObserver`] discards them.

use crate::report::PerformanceReport;
use forecast_core::{MatrixData, RecurrenceIssue};
use std::fmt::Debug;
use std::time::Duration;

/// A task that was degraded to zero hours during a build
#[derive(Debug, Clone, PartialEq)]
pub struct TaskIssue {
    /// Recurring task id
    pub task_id: String,
    /// Owning client
    pub client_id: String,
    /// First month the issue was seen in
    pub month: String,
    /// What was wrong
    pub issue: RecurrenceIssue,
}

/// Checkpoint callbacks; every method defaults to doing nothing
pub trait MatrixObserver: Send + Sync + Debug {
    /// A build is starting
    fn build_started(&self, _task_count: usize, _month_count: usize) {}

    /// A task contributed zero hours because it is malformed
    ///
    /// Reported once per task and build.
    fn task_issue(&self, _issue: &TaskIssue) {}

    /// A build finished
    fn build_completed(&self, _matrix: &MatrixData, _elapsed: Duration) {}

    /// A filter was applied
    fn filter_applied(&self, _report: &PerformanceReport) {}
}

/// Observer that ignores every checkpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MatrixObserver for NoopObserver {}

/// Observer that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MatrixObserver for TracingObserver {
    fn build_started(&self, task_count: usize, month_count: usize) {
        tracing::debug!(task_count, month_count, "building demand matrix");
    }

    fn task_issue(&self, issue: &TaskIssue) {
        tracing::warn!(
            task_id = %issue.task_id,
            client_id = %issue.client_id,
            month = %issue.month,
            "task contributes no hours: {}",
            issue.issue
        );
    }

    fn build_completed(&self, matrix: &MatrixData, elapsed: Duration) {
        tracing::info!(
            skills = matrix.skills.len(),
            months = matrix.months.len(),
            data_points = matrix.data_points.len(),
            total_demand = matrix.total_demand,
            elapsed_ms = elapsed.as_millis() as u64,
            "demand matrix built"
        );
    }

    fn filter_applied(&self, report: &PerformanceReport) {
        tracing::debug!(
            original = report.original_data_points,
            filtered = report.filtered_data_points,
            reduction_percent = report.data_point_reduction_percent,
            "filter applied"
        );
    }
}
