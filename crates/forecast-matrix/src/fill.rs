//! Sparse to dense normalization
//!
//! The expected skills and months define the grid. Every pair gets exactly
//! one cell, ordered skill-major then chronologically; missing pairs become
//! zero cells, cells off the grid are dropped and duplicate cells are merged.

use forecast_core::{ClientTaskDemand, DemandDataPoint, MatrixData, MonthInfo};
use std::collections::{HashMap, HashSet};

/// Densify `matrix` onto the `expected_skills` x `expected_months` grid
///
/// The input is left untouched. The horizon offset is carried over.
#[must_use]
pub fn fill(
    matrix: &MatrixData,
    expected_skills: &[String],
    expected_months: &[MonthInfo],
) -> MatrixData {
    densify(
        matrix.data_points.clone(),
        expected_skills,
        expected_months,
        matrix.horizon_offset,
    )
}

/// Densify owned cells onto a grid
pub(crate) fn densify(
    points: Vec<DemandDataPoint>,
    expected_skills: &[String],
    expected_months: &[MonthInfo],
    horizon_offset: usize,
) -> MatrixData {
    let skills = unique_by(expected_skills, |s| s.as_str());
    let months = unique_by(expected_months, |m| m.key.as_str());

    let skill_index: HashMap<&str, usize> = skills
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();
    let month_index: HashMap<&str, usize> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (m.key.as_str(), i))
        .collect();

    let width = months.len();
    let mut slots: Vec<Vec<ClientTaskDemand>> = vec![Vec::new(); skills.len() * width];
    for point in points {
        let slot = skill_index
            .get(point.skill_type.as_str())
            .zip(month_index.get(point.month.as_str()))
            .map(|(si, mi)| si * width + mi);
        if let Some(slot) = slot {
            slots[slot].extend(point.task_breakdown);
        }
    }

    let mut data_points = Vec::with_capacity(slots.len());
    let mut slots = slots.into_iter();
    for skill in &skills {
        for month in &months {
            let breakdown = slots.next().unwrap_or_default();
            data_points.push(DemandDataPoint::from_breakdown(skill.clone(), month, breakdown));
        }
    }

    MatrixData::from_parts(months, skills, data_points, horizon_offset)
}

fn unique_by<T: Clone, F>(items: &[T], key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(key(*item).to_string()))
        .cloned()
        .collect()
}
