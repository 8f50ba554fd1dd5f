//! Filter effectiveness reporting

use forecast_core::{FilterConfig, MatrixData, PreferredStaffFilterMode};
use serde::{Deserialize, Serialize};

/// Which parts of a [`FilterConfig`] were restrictive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilters {
    /// Number of selected skills, zero meaning all
    pub skills: usize,
    /// Number of selected clients, zero meaning all
    pub clients: usize,
    pub preferred_staff_mode: PreferredStaffFilterMode,
    pub preferred_staff: usize,
    /// Months kept out of the original matrix
    pub months_kept: usize,
}

/// Original vs filtered matrix comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub original_data_points: usize,
    pub filtered_data_points: usize,
    pub data_point_reduction_percent: f64,
    pub original_total_demand: f64,
    pub filtered_total_demand: f64,
    pub demand_reduction_percent: f64,
    pub original_total_tasks: usize,
    pub filtered_total_tasks: usize,
    pub active_filters: ActiveFilters,
}

impl PerformanceReport {
    /// Compare a matrix with its filtered counterpart
    #[must_use]
    pub fn new(original: &MatrixData, filtered: &MatrixData, config: &FilterConfig) -> Self {
        Self {
            original_data_points: original.data_points.len(),
            filtered_data_points: filtered.data_points.len(),
            data_point_reduction_percent: reduction(
                original.data_points.len() as f64,
                filtered.data_points.len() as f64,
            ),
            original_total_demand: original.total_demand,
            filtered_total_demand: filtered.total_demand,
            demand_reduction_percent: reduction(original.total_demand, filtered.total_demand),
            original_total_tasks: original.total_tasks,
            filtered_total_tasks: filtered.total_tasks,
            active_filters: ActiveFilters {
                skills: config.selected_skills.len(),
                clients: config.selected_clients.len(),
                preferred_staff_mode: config.preferred_staff_filter_mode,
                preferred_staff: config.selected_preferred_staff.len(),
                months_kept: filtered.months.len(),
            },
        }
    }

    /// Whether the filter removed anything
    #[inline]
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.filtered_data_points < self.original_data_points
            || self.filtered_total_tasks < self.original_total_tasks
    }
}

fn reduction(original: f64, filtered: f64) -> f64 {
    if original > 0.0 {
        (original - filtered) / original * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::{DemandDataPoint, MonthInfo};

    fn grid(skills: &[&str], months: &[&str]) -> MatrixData {
        let months: Vec<MonthInfo> = months.iter().map(|k| MonthInfo::from_key(k).unwrap()).collect();
        let skills: Vec<String> = skills.iter().map(|s| s.to_string()).collect();
        let points = skills
            .iter()
            .flat_map(|s| months.iter().map(move |m| DemandDataPoint::empty(s.clone(), m)))
            .collect();
        MatrixData::from_parts(months, skills, points, 0)
    }

    #[test]
    fn reduction_is_percentage_of_original() {
        let original = grid(&["A", "B"], &["2025-01", "2025-02"]);
        let filtered = grid(&["A"], &["2025-01"]);
        let config = FilterConfig::new().with_skills(["A"]).with_month_range(0, 0);

        let report = PerformanceReport::new(&original, &filtered, &config);
        assert_eq!(report.original_data_points, 4);
        assert_eq!(report.filtered_data_points, 1);
        assert!((report.data_point_reduction_percent - 75.0).abs() < 1e-9);
        assert_eq!(report.demand_reduction_percent, 0.0);
        assert_eq!(report.active_filters.skills, 1);
        assert_eq!(report.active_filters.months_kept, 1);
        assert!(report.is_effective());
    }

    #[test]
    fn empty_original_reports_zero_reduction() {
        let empty = MatrixData::empty();
        let report = PerformanceReport::new(&empty, &empty, &FilterConfig::new());
        assert_eq!(report.data_point_reduction_percent, 0.0);
        assert!(!report.is_effective());
    }
}
