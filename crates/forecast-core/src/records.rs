//! Input records and ingestion
//!
//! The `*Record` types mirror what the data-access layer hands over and
//! tolerate missing fields. Ingestion normalizes them once into
//! [`RecurringTask`] and [`StaffCapacity`], which the rest of the engine uses.

use crate::month::MonthInfo;
use crate::recurrence::RecurrenceType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw recurring task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRecord {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub estimated_hours: Option<f64>,
    pub required_skills: Vec<String>,
    pub recurrence_type: Option<String>,
    pub recurrence_interval: Option<i64>,
    pub preferred_staff_id: Option<String>,
    pub is_active: bool,
    /// Monthly hours for `Custom` recurrence
    pub custom_monthly_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for TaskRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            client_id: String::new(),
            name: String::new(),
            estimated_hours: None,
            required_skills: Vec::new(),
            recurrence_type: None,
            recurrence_interval: None,
            preferred_staff_id: None,
            is_active: true,
            custom_monthly_hours: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// Raw client, used for names and client counts only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientRecord {
    pub id: String,
    pub legal_name: String,
    pub status: Option<String>,
}

/// Raw staff availability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffCapacityRecord {
    pub staff_id: String,
    pub staff_name: Option<String>,
    pub assigned_skills: Vec<String>,
    pub weekly_available_hours: Option<f64>,
}

/// Normalized recurring task
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTask {
    pub id: String,
    pub client_id: String,
    pub name: String,
    /// Missing hours become zero; NaN is kept so the calculator can flag it
    pub estimated_hours: f64,
    /// Trimmed, non-empty, deduplicated
    pub required_skills: Vec<String>,
    pub recurrence: RecurrenceType,
    /// Missing interval becomes one; invalid values are kept for diagnostics
    pub interval: i64,
    pub custom_monthly_hours: Option<f64>,
    pub preferred_staff_id: Option<String>,
    pub active_from: Option<NaiveDate>,
    pub active_until: Option<NaiveDate>,
}

impl RecurringTask {
    /// Normalize a raw record
    #[must_use]
    pub fn from_record(record: &TaskRecord) -> Self {
        Self {
            id: record.id.trim().to_string(),
            client_id: record.client_id.trim().to_string(),
            name: record.name.trim().to_string(),
            estimated_hours: record.estimated_hours.unwrap_or(0.0),
            required_skills: normalize_skills(&record.required_skills),
            recurrence: record
                .recurrence_type
                .as_deref()
                .map_or(RecurrenceType::None, RecurrenceType::from),
            interval: record.recurrence_interval.unwrap_or(1),
            custom_monthly_hours: record.custom_monthly_hours,
            preferred_staff_id: normalize_reference(record.preferred_staff_id.as_deref()),
            active_from: record.start_date,
            active_until: record.end_date,
        }
    }

    /// Whether the task runs during `month`
    #[must_use]
    pub fn is_active_in(&self, month: &MonthInfo) -> bool {
        let starts_before = self
            .active_from
            .map_or(true, |from| MonthInfo::from_date(from).key <= month.key);
        let ends_after = self
            .active_until
            .map_or(true, |until| MonthInfo::from_date(until).key >= month.key);
        starts_before && ends_after
    }

    /// Whether the task requires `skill`
    #[inline]
    #[must_use]
    pub fn requires(&self, skill: &str) -> bool {
        self.required_skills.iter().any(|s| s == skill)
    }
}

/// Normalized staff availability
#[derive(Debug, Clone, PartialEq)]
pub struct StaffCapacity {
    pub staff_id: String,
    pub name: Option<String>,
    pub skills: Vec<String>,
    /// Never negative
    pub weekly_hours: f64,
}

impl StaffCapacity {
    /// Normalize a raw record
    #[must_use]
    pub fn from_record(record: &StaffCapacityRecord) -> Self {
        let weekly_hours = record
            .weekly_available_hours
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(0.0);
        Self {
            staff_id: record.staff_id.trim().to_string(),
            name: normalize_reference(record.staff_name.as_deref()),
            skills: normalize_skills(&record.assigned_skills),
            weekly_hours,
        }
    }
}

/// Normalize active task records, dropping inactive ones
#[must_use]
pub fn ingest_tasks(records: &[TaskRecord]) -> Vec<RecurringTask> {
    records
        .iter()
        .filter(|r| r.is_active)
        .map(RecurringTask::from_record)
        .collect()
}

/// Normalize staff records
#[must_use]
pub fn ingest_staff(records: &[StaffCapacityRecord]) -> Vec<StaffCapacity> {
    records.iter().map(StaffCapacity::from_record).collect()
}

/// Trim a skill name, `None` when blank
#[inline]
#[must_use]
pub fn normalize_skill(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trim an optional reference, `None` when absent or blank
#[inline]
#[must_use]
pub fn normalize_reference(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize_skill)
}

fn normalize_skills(raw: &[String]) -> Vec<String> {
    let mut skills: Vec<String> = Vec::with_capacity(raw.len());
    for skill in raw.iter().filter_map(|s| normalize_skill(s)) {
        if !skills.contains(&skill) {
            skills.push(skill);
        }
    }
    skills
}
