//! Upstream data boundary

use crate::error::SourceError;
use forecast_core::{ClientRecord, StaffCapacityRecord, TaskRecord};
use std::fmt::Debug;

/// Where task, client and staff records come from
///
/// Implementations own all I/O; the engine only awaits these calls and
/// runs the three fetches concurrently.
#[async_trait::async_trait]
pub trait ForecastDataSource: Send + Sync + Debug {
    /// Recurring tasks, active or not
    async fn tasks(&self) -> Result<Vec<TaskRecord>, SourceError>;

    /// Clients referenced by tasks
    async fn clients(&self) -> Result<Vec<ClientRecord>, SourceError>;

    /// Staff availability
    async fn staff_capacity(&self) -> Result<Vec<StaffCapacityRecord>, SourceError>;
}

/// Source serving fixed records
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tasks: Vec<TaskRecord>,
    clients: Vec<ClientRecord>,
    staff: Vec<StaffCapacityRecord>,
}

impl InMemorySource {
    #[must_use]
    pub fn new(
        tasks: Vec<TaskRecord>,
        clients: Vec<ClientRecord>,
        staff: Vec<StaffCapacityRecord>,
    ) -> Self {
        Self {
            tasks,
            clients,
            staff,
        }
    }
}

#[async_trait::async_trait]
impl ForecastDataSource for InMemorySource {
    async fn tasks(&self) -> Result<Vec<TaskRecord>, SourceError> {
        Ok(self.tasks.clone())
    }

    async fn clients(&self) -> Result<Vec<ClientRecord>, SourceError> {
        Ok(self.clients.clone())
    }

    async fn staff_capacity(&self) -> Result<Vec<StaffCapacityRecord>, SourceError> {
        Ok(self.staff.clone())
    }
}
