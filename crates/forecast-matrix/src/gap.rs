//! Demand vs capacity per cell
//!
//! `gap = capacity - demand` everywhere; a negative gap is a shortage.

use forecast_core::{CapacityMatrix, GapCell, MatrixData};
use std::collections::HashMap;

/// Gap cells over the demand grid
///
/// Skills that only appear on the capacity side are appended after the
/// demand skills so idle capacity stays visible. Missing cells on either
/// side count as zero hours.
#[must_use]
pub fn gap_analysis(demand: &MatrixData, capacity: &CapacityMatrix) -> Vec<GapCell> {
    let demand_hours: HashMap<(&str, &str), f64> = demand
        .data_points
        .iter()
        .map(|p| ((p.skill_type.as_str(), p.month.as_str()), p.demand_hours))
        .collect();
    let capacity_hours: HashMap<(&str, &str), f64> = capacity
        .data_points
        .iter()
        .map(|p| ((p.skill_type.as_str(), p.month.as_str()), p.capacity_hours))
        .collect();

    let skills = demand.skills.iter().chain(
        capacity
            .skills
            .iter()
            .filter(|s| !demand.skills.contains(s)),
    );

    let mut cells = Vec::new();
    for skill in skills {
        for month in &demand.months {
            let key = (skill.as_str(), month.key.as_str());
            cells.push(GapCell::new(
                skill.clone(),
                month,
                demand_hours.get(&key).copied().unwrap_or(0.0),
                capacity_hours.get(&key).copied().unwrap_or(0.0),
            ));
        }
    }
    cells
}

/// Cells where demand exceeds capacity, worst first
#[must_use]
pub fn shortages(cells: &[GapCell]) -> Vec<GapCell> {
    let mut short: Vec<GapCell> = cells.iter().filter(|c| c.is_shortage()).cloned().collect();
    short.sort_by(|a, b| a.gap.total_cmp(&b.gap));
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::{CapacityDataPoint, DemandDataPoint, MonthInfo, StaffCapacityShare};
    use forecast_test_utils::{demand_entry, month};

    fn jan() -> MonthInfo {
        month("2025-01")
    }

    fn demand_cell(skill: &str, hours: f64) -> DemandDataPoint {
        DemandDataPoint::from_breakdown(
            skill,
            &jan(),
            vec![demand_entry("c1", &format!("{skill}-task"), skill, hours)],
        )
    }

    fn capacity_cell(skill: &str, hours: f64) -> CapacityDataPoint {
        CapacityDataPoint::from_breakdown(
            skill,
            &jan(),
            vec![StaffCapacityShare {
                staff_id: "s1".to_string(),
                staff_name: None,
                monthly_hours: hours,
            }],
        )
    }

    #[test]
    fn gap_is_capacity_minus_demand() {
        let demand = MatrixData::from_parts(
            vec![jan()],
            vec!["CPA".to_string(), "Junior".to_string()],
            vec![demand_cell("CPA", 120.0), demand_cell("Junior", 10.0)],
            0,
        );
        let capacity = CapacityMatrix::from_parts(
            vec![jan()],
            vec!["CPA".to_string(), "Junior".to_string(), "Manager".to_string()],
            vec![capacity_cell("CPA", 100.0), capacity_cell("Junior", 40.0), capacity_cell("Manager", 80.0)],
        );

        let cells = gap_analysis(&demand, &capacity);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].gap, -20.0);
        assert!((cells[1].utilization_percent - 25.0).abs() < 1e-9);
        assert_eq!(cells[2].skill_type, "Manager");
        assert_eq!(cells[2].demand_hours, 0.0);
        assert_eq!(cells[2].gap, 80.0);

        let short = shortages(&cells);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].skill_type, "CPA");
    }

    #[test]
    fn missing_capacity_counts_as_zero() {
        let demand = MatrixData::from_parts(
            vec![jan()],
            vec!["CPA".to_string()],
            vec![demand_cell("CPA", 12.0)],
            0,
        );
        let empty = CapacityMatrix::from_parts(vec![jan()], Vec::new(), Vec::new());
        let cells = gap_analysis(&demand, &empty);
        assert_eq!(cells[0].gap, -12.0);
        assert_eq!(cells[0].utilization_percent, 0.0);
    }
}
