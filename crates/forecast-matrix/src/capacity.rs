//! Capacity matrix construction
//!
//! Weekly availability is converted with [`WEEKS_PER_MONTH`], the same
//! constant used for weekly demand, and split evenly across the skills a
//! staff member holds so total capacity is not counted twice.

use crate::error::MatrixResult;
use forecast_core::{
    ingest_staff, CapacityDataPoint, CapacityMatrix, DateRange, MonthInfo, StaffCapacity,
    StaffCapacityRecord, StaffCapacityShare, WEEKS_PER_MONTH,
};
use std::collections::{BTreeSet, HashMap};

/// Build the dense capacity matrix for `date_range`
pub fn build_capacity(
    staff: &[StaffCapacityRecord],
    date_range: &DateRange,
) -> MatrixResult<CapacityMatrix> {
    let months = date_range.months()?;
    let staff = ingest_staff(staff);
    let skills: Vec<String> = staff
        .iter()
        .flat_map(|s| s.skills.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut data_points = Vec::with_capacity(skills.len() * months.len());
    for skill in &skills {
        let shares: Vec<StaffCapacityShare> = staff
            .iter()
            .filter_map(|member| share_for(member, skill))
            .collect();
        for month in &months {
            data_points.push(CapacityDataPoint::from_breakdown(
                skill.clone(),
                month,
                shares.clone(),
            ));
        }
    }

    Ok(CapacityMatrix::from_parts(months, skills, data_points))
}

/// Re-key `capacity` onto another grid, typically a demand matrix's axes
///
/// Pairs without capacity become zero cells; cells off the grid are dropped.
#[must_use]
pub fn align_capacity(
    capacity: &CapacityMatrix,
    skills: &[String],
    months: &[MonthInfo],
) -> CapacityMatrix {
    let existing: HashMap<(&str, &str), &CapacityDataPoint> = capacity
        .data_points
        .iter()
        .map(|p| ((p.skill_type.as_str(), p.month.as_str()), p))
        .collect();

    let mut data_points = Vec::with_capacity(skills.len() * months.len());
    for skill in skills {
        for month in months {
            let breakdown = existing
                .get(&(skill.as_str(), month.key.as_str()))
                .map(|p| p.staff_breakdown.clone())
                .unwrap_or_default();
            data_points.push(CapacityDataPoint::from_breakdown(skill.clone(), month, breakdown));
        }
    }

    CapacityMatrix::from_parts(months.to_vec(), skills.to_vec(), data_points)
}

fn share_for(member: &StaffCapacity, skill: &str) -> Option<StaffCapacityShare> {
    if member.weekly_hours <= 0.0 || !member.skills.iter().any(|s| s == skill) {
        return None;
    }
    let monthly = member.weekly_hours * WEEKS_PER_MONTH / member.skills.len() as f64;
    Some(StaffCapacityShare {
        staff_id: member.staff_id.clone(),
        staff_name: member.name.clone(),
        monthly_hours: monthly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(id: &str, skills: &[&str], weekly: f64) -> StaffCapacityRecord {
        StaffCapacityRecord {
            staff_id: id.to_string(),
            staff_name: Some(format!("Staff {id}")),
            assigned_skills: skills.iter().map(|s| s.to_string()).collect(),
            weekly_available_hours: Some(weekly),
        }
    }

    fn range(months: u32) -> DateRange {
        DateRange::months_from(MonthInfo::first_day("2025-01").unwrap(), months)
    }

    #[test]
    fn weekly_hours_become_monthly_capacity() {
        let matrix = build_capacity(&[staff("s1", &["CPA"], 40.0)], &range(3)).unwrap();
        assert_eq!(matrix.data_points.len(), 3);
        let cell = matrix.cell("CPA", "2025-02").unwrap();
        assert!((cell.capacity_hours - 173.2).abs() < 1e-9);
        assert_eq!(cell.staff_count, 1);
        assert!((matrix.total_capacity - 3.0 * 173.2).abs() < 1e-9);
    }

    #[test]
    fn multi_skill_staff_split_evenly() {
        let matrix = build_capacity(
            &[staff("s1", &["CPA", "Senior"], 40.0), staff("s2", &["Senior"], 20.0)],
            &range(1),
        )
        .unwrap();
        let cpa = matrix.cell("CPA", "2025-01").unwrap();
        let senior = matrix.cell("Senior", "2025-01").unwrap();
        assert!((cpa.capacity_hours - 20.0 * WEEKS_PER_MONTH).abs() < 1e-9);
        assert!((senior.capacity_hours - 40.0 * WEEKS_PER_MONTH).abs() < 1e-9);
        assert_eq!(senior.staff_count, 2);
        assert!((matrix.total_capacity - 60.0 * WEEKS_PER_MONTH).abs() < 1e-9);
    }

    #[test]
    fn staff_without_hours_adds_skill_but_no_share() {
        let matrix = build_capacity(&[staff("s1", &["Manager"], 0.0)], &range(2)).unwrap();
        assert_eq!(matrix.skills, vec!["Manager"]);
        assert_eq!(matrix.total_capacity, 0.0);
        assert_eq!(matrix.data_points[0].staff_count, 0);
    }

    #[test]
    fn align_fills_missing_skills_with_zero() {
        let capacity = build_capacity(&[staff("s1", &["CPA"], 10.0)], &range(2)).unwrap();
        let skills = vec!["CPA".to_string(), "Junior".to_string()];
        let aligned = align_capacity(&capacity, &skills, &capacity.months);
        assert_eq!(aligned.data_points.len(), 4);
        assert_eq!(aligned.cell("Junior", "2025-02").unwrap().capacity_hours, 0.0);
        assert!((aligned.total_capacity - capacity.total_capacity).abs() < 1e-9);
    }
}
