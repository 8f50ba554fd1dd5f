//! Matrix model
//!
//! Value types shared by every stage of the engine:
//! - demand cells and the matrix that holds them
//! - capacity cells and gap cells
//! - filter configuration
//!
//! Aggregates on a cell are always derived from its breakdown via
//! [`DemandDataPoint::from_breakdown`]; matrix totals via
//! [`MatrixData::from_parts`].

use crate::month::MonthInfo;
use crate::recurrence::RecurrencePattern;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// One task's contribution to one skill/month cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTaskDemand {
    pub client_id: String,
    pub client_name: String,
    pub recurring_task_id: String,
    pub task_name: String,
    pub skill_type: String,
    pub estimated_hours: f64,
    pub recurrence_pattern: RecurrencePattern,
    pub monthly_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_staff_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_staff_name: Option<String>,
}

/// One demand cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandDataPoint {
    pub skill_type: String,
    /// [`MonthInfo::key`]
    pub month: String,
    pub month_label: String,
    pub demand_hours: f64,
    pub task_count: usize,
    pub client_count: usize,
    pub task_breakdown: Vec<ClientTaskDemand>,
}

impl DemandDataPoint {
    /// Build a cell whose aggregates come from `task_breakdown`
    #[must_use]
    pub fn from_breakdown(
        skill_type: impl Into<String>,
        month: &MonthInfo,
        task_breakdown: Vec<ClientTaskDemand>,
    ) -> Self {
        let demand_hours = task_breakdown.iter().map(|t| t.monthly_hours).sum();
        let client_count = task_breakdown
            .iter()
            .map(|t| t.client_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            skill_type: skill_type.into(),
            month: month.key.clone(),
            month_label: month.label.clone(),
            demand_hours,
            task_count: task_breakdown.len(),
            client_count,
            task_breakdown,
        }
    }

    /// Zero-valued cell
    #[inline]
    #[must_use]
    pub fn empty(skill_type: impl Into<String>, month: &MonthInfo) -> Self {
        Self::from_breakdown(skill_type, month, Vec::new())
    }

    /// Month of this cell
    #[must_use]
    pub fn month_info(&self) -> MonthInfo {
        MonthInfo {
            key: self.month.clone(),
            label: self.month_label.clone(),
        }
    }

    /// Whether the stored aggregates agree with the breakdown
    #[must_use]
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        let rebuilt = Self::from_breakdown(
            self.skill_type.clone(),
            &self.month_info(),
            self.task_breakdown.clone(),
        );
        (rebuilt.demand_hours - self.demand_hours).abs() <= tolerance
            && rebuilt.task_count == self.task_count
            && rebuilt.client_count == self.client_count
    }
}

/// Per-skill totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub total_hours: f64,
    /// Distinct recurring tasks
    pub task_count: usize,
    /// Distinct clients
    pub client_count: usize,
}

/// Skill x month demand matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixData {
    /// Chronological, unique keys
    pub months: Vec<MonthInfo>,
    /// Sorted, unique
    pub skills: Vec<String>,
    pub data_points: Vec<DemandDataPoint>,
    pub total_demand: f64,
    /// Distinct recurring tasks across all cells
    pub total_tasks: usize,
    /// Distinct clients across all cells
    pub total_clients: usize,
    pub skill_summary: BTreeMap<String, SkillSummary>,
    /// Position of `months[0]` in the horizon the matrix was built for
    #[serde(default)]
    pub horizon_offset: usize,
}

impl MatrixData {
    /// Assemble a matrix and derive its totals from the cells
    #[must_use]
    pub fn from_parts(
        months: Vec<MonthInfo>,
        skills: Vec<String>,
        data_points: Vec<DemandDataPoint>,
        horizon_offset: usize,
    ) -> Self {
        let mut all_tasks = HashSet::new();
        let mut all_clients = HashSet::new();
        let mut per_skill: BTreeMap<&str, (f64, HashSet<&str>, HashSet<&str>)> = skills
            .iter()
            .map(|s| (s.as_str(), (0.0, HashSet::new(), HashSet::new())))
            .collect();

        let mut total_demand = 0.0;
        for point in &data_points {
            total_demand += point.demand_hours;
            let (hours, tasks, clients) = per_skill
                .entry(point.skill_type.as_str())
                .or_insert_with(|| (0.0, HashSet::new(), HashSet::new()));
            *hours += point.demand_hours;
            for entry in &point.task_breakdown {
                tasks.insert(entry.recurring_task_id.as_str());
                clients.insert(entry.client_id.as_str());
                all_tasks.insert(entry.recurring_task_id.as_str());
                all_clients.insert(entry.client_id.as_str());
            }
        }

        let skill_summary = per_skill
            .into_iter()
            .map(|(skill, (total_hours, tasks, clients))| {
                (
                    skill.to_string(),
                    SkillSummary {
                        total_hours,
                        task_count: tasks.len(),
                        client_count: clients.len(),
                    },
                )
            })
            .collect();
        let total_tasks = all_tasks.len();
        let total_clients = all_clients.len();

        Self {
            months,
            skills,
            data_points,
            total_demand,
            total_tasks,
            total_clients,
            skill_summary,
            horizon_offset,
        }
    }

    /// Matrix with no axes and no cells
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Vec::new(), Vec::new(), 0)
    }

    /// Cell for a skill and month key
    #[must_use]
    pub fn cell(&self, skill: &str, month: &str) -> Option<&DemandDataPoint> {
        self.data_points
            .iter()
            .find(|p| p.skill_type == skill && p.month == month)
    }

    /// Whether every declared skill/month pair has exactly one cell
    #[must_use]
    pub fn is_dense(&self) -> bool {
        let expected = self.skills.len() * self.months.len();
        if self.data_points.len() != expected {
            return false;
        }
        let seen: HashSet<(&str, &str)> = self
            .data_points
            .iter()
            .map(|p| (p.skill_type.as_str(), p.month.as_str()))
            .collect();
        seen.len() == expected
            && self.skills.iter().all(|s| {
                self.months
                    .iter()
                    .all(|m| seen.contains(&(s.as_str(), m.key.as_str())))
            })
    }
}

/// One staff member's share of a capacity cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCapacityShare {
    pub staff_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    pub monthly_hours: f64,
}

/// One capacity cell, keyed like [`DemandDataPoint`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityDataPoint {
    pub skill_type: String,
    pub month: String,
    pub month_label: String,
    pub capacity_hours: f64,
    pub staff_count: usize,
    pub staff_breakdown: Vec<StaffCapacityShare>,
}

impl CapacityDataPoint {
    /// Build a cell whose aggregates come from `staff_breakdown`
    #[must_use]
    pub fn from_breakdown(
        skill_type: impl Into<String>,
        month: &MonthInfo,
        staff_breakdown: Vec<StaffCapacityShare>,
    ) -> Self {
        Self {
            skill_type: skill_type.into(),
            month: month.key.clone(),
            month_label: month.label.clone(),
            capacity_hours: staff_breakdown.iter().map(|s| s.monthly_hours).sum(),
            staff_count: staff_breakdown.len(),
            staff_breakdown,
        }
    }
}

/// Skill x month capacity matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityMatrix {
    pub months: Vec<MonthInfo>,
    pub skills: Vec<String>,
    pub data_points: Vec<CapacityDataPoint>,
    pub total_capacity: f64,
    /// Capacity hours per skill over all months
    pub skill_totals: BTreeMap<String, f64>,
}

impl CapacityMatrix {
    /// Assemble a matrix and derive its totals from the cells
    #[must_use]
    pub fn from_parts(
        months: Vec<MonthInfo>,
        skills: Vec<String>,
        data_points: Vec<CapacityDataPoint>,
    ) -> Self {
        let mut skill_totals: BTreeMap<String, f64> =
            skills.iter().map(|s| (s.clone(), 0.0)).collect();
        for point in &data_points {
            *skill_totals.entry(point.skill_type.clone()).or_default() += point.capacity_hours;
        }
        let total_capacity = data_points.iter().map(|p| p.capacity_hours).sum();
        Self {
            months,
            skills,
            data_points,
            total_capacity,
            skill_totals,
        }
    }

    /// Cell for a skill and month key
    #[must_use]
    pub fn cell(&self, skill: &str, month: &str) -> Option<&CapacityDataPoint> {
        self.data_points
            .iter()
            .find(|p| p.skill_type == skill && p.month == month)
    }
}

/// Demand set against capacity for one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapCell {
    pub skill_type: String,
    pub month: String,
    pub month_label: String,
    pub demand_hours: f64,
    pub capacity_hours: f64,
    /// `capacity - demand`; negative means a shortage
    pub gap: f64,
    /// Demand as a percentage of capacity, zero without capacity
    pub utilization_percent: f64,
}

impl GapCell {
    /// Compute gap and utilization for a cell
    #[must_use]
    pub fn new(
        skill_type: impl Into<String>,
        month: &MonthInfo,
        demand_hours: f64,
        capacity_hours: f64,
    ) -> Self {
        let utilization_percent = if capacity_hours > 0.0 {
            demand_hours / capacity_hours * 100.0
        } else {
            0.0
        };
        Self {
            skill_type: skill_type.into(),
            month: month.key.clone(),
            month_label: month.label.clone(),
            demand_hours,
            capacity_hours,
            gap: capacity_hours - demand_hours,
            utilization_percent,
        }
    }

    /// Whether demand exceeds capacity
    #[inline]
    #[must_use]
    pub fn is_shortage(&self) -> bool {
        self.gap < 0.0
    }
}

/// Preferred staff filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredStaffFilterMode {
    /// No staff-based exclusion
    #[default]
    All,
    /// Only tasks whose preferred staff is selected
    Specific,
    /// Only tasks without a preferred staff
    None,
}

/// Inclusive window of horizon positions
///
/// On the wire a missing bound is open and negative positions read as 0;
/// the filter clamps whatever remains to the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthRange {
    #[serde(deserialize_with = "saturating_position")]
    pub start: usize,
    #[serde(deserialize_with = "saturating_position")]
    pub end: usize,
}

fn saturating_position<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    struct PositionVisitor;

    impl Visitor<'_> for PositionVisitor {
        type Value = usize;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a month position")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<usize, E> {
            Ok(usize::try_from(v.max(0)).unwrap_or(usize::MAX))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<usize, E> {
            Ok(usize::try_from(v).unwrap_or(usize::MAX))
        }

        // `as` saturates and maps NaN to 0
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<usize, E> {
            Ok(v as usize)
        }
    }

    deserializer.deserialize_any(PositionVisitor)
}

impl MonthRange {
    /// Window from `start` to `end`, inclusive
    #[inline]
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Every month
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::new(0, usize::MAX)
    }
}

impl Default for MonthRange {
    fn default() -> Self {
        Self::all()
    }
}

/// Filter applied to a built matrix
///
/// Empty skill or client selections mean "all". The staff selection is only
/// read in [`PreferredStaffFilterMode::Specific`], where an empty selection
/// matches nothing. Staff ids match after trimming and are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub selected_skills: Vec<String>,
    pub selected_clients: Vec<String>,
    pub preferred_staff_filter_mode: PreferredStaffFilterMode,
    pub selected_preferred_staff: Vec<String>,
    pub month_range: MonthRange,
}

impl FilterConfig {
    /// Filter that keeps everything
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to skills
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to clients
    #[must_use]
    pub fn with_clients<I, S>(mut self, clients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_clients = clients.into_iter().map(Into::into).collect();
        self
    }

    /// Keep only tasks preferred for the given staff
    #[must_use]
    pub fn with_preferred_staff<I, S>(mut self, staff: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_staff_filter_mode = PreferredStaffFilterMode::Specific;
        self.selected_preferred_staff = staff.into_iter().map(Into::into).collect();
        self
    }

    /// Keep only tasks without a preferred staff
    #[inline]
    #[must_use]
    pub fn unassigned_only(mut self) -> Self {
        self.preferred_staff_filter_mode = PreferredStaffFilterMode::None;
        self
    }

    /// Restrict to a window of horizon positions
    #[inline]
    #[must_use]
    pub fn with_month_range(mut self, start: usize, end: usize) -> Self {
        self.month_range = MonthRange::new(start, end);
        self
    }

    /// Whether the filter can remove anything
    #[must_use]
    pub fn is_restrictive(&self) -> bool {
        !self.selected_skills.is_empty()
            || !self.selected_clients.is_empty()
            || self.preferred_staff_filter_mode != PreferredStaffFilterMode::All
            || self.month_range != MonthRange::all()
    }
}
