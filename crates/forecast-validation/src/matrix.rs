//! Matrix structure checks
//!
//! Every check runs; findings are collected instead of returned early.

use crate::diagnostic::{DiagnosticKind, ValidationResult};
use forecast_core::{DemandDataPoint, MatrixData, MonthInfo, HOURS_TOLERANCE};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Structural validator for matrices and raw records
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate a typed matrix
    #[must_use]
    pub fn validate(&self, matrix: &MatrixData) -> ValidationResult {
        let mut result = ValidationResult::new();

        check_totals(matrix, &mut result);

        let skills: HashSet<&str> = matrix.skills.iter().map(String::as_str).collect();
        let months: HashSet<&str> = matrix.months.iter().map(|m| m.key.as_str()).collect();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for (idx, point) in matrix.data_points.iter().enumerate() {
            check_point(idx, point, &skills, &months, &mut result);
            if !seen.insert((point.skill_type.as_str(), point.month.as_str())) {
                result.warn(
                    DiagnosticKind::DuplicateCell,
                    format!(
                        "duplicate cell for skill '{}' in {}",
                        point.skill_type, point.month
                    ),
                );
            }
        }

        check_data_presence(matrix, &mut result);

        tracing::debug!(
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "matrix validated"
        );
        result
    }

    /// Validate an untyped matrix, such as one read back from JSON
    ///
    /// Shape problems are reported first; when the value is a well-formed
    /// matrix the typed checks of [`Self::validate`] run as well.
    #[must_use]
    pub fn validate_json(&self, value: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();
        let Some(root) = value.as_object() else {
            result.error(DiagnosticKind::InvalidShape, "matrix must be a JSON object");
            return result;
        };

        let months = require_array(root, "months", &mut result);
        let skills = require_array(root, "skills", &mut result);
        let points = require_array(root, "dataPoints", &mut result);
        match root.get("skillSummary") {
            None => result.error(DiagnosticKind::MissingField, "missing field 'skillSummary'"),
            Some(Value::Object(_)) => {}
            Some(_) => result.error(DiagnosticKind::InvalidShape, "'skillSummary' must be an object"),
        }
        for field in ["totalDemand", "totalTasks", "totalClients"] {
            match root.get(field) {
                None => result.error(DiagnosticKind::MissingField, format!("missing field '{field}'")),
                Some(Value::Number(_)) => {}
                Some(Value::Null) => result.error(
                    DiagnosticKind::NonFiniteValue,
                    format!("'{field}' is not a finite number"),
                ),
                Some(_) => result.error(
                    DiagnosticKind::InvalidShape,
                    format!("'{field}' must be a number"),
                ),
            }
        }

        let declared_skills: HashSet<&str> = skills
            .map(|skills| {
                skills
                    .iter()
                    .filter_map(|s| {
                        if s.is_string() {
                            s.as_str()
                        } else {
                            result.error(DiagnosticKind::InvalidShape, "skills must be strings");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        if let Some(months) = months {
            if months
                .iter()
                .any(|m| m.get("key").and_then(Value::as_str).is_none())
            {
                result.error(DiagnosticKind::InvalidShape, "months must be objects with a 'key'");
            }
        }

        if !result.is_valid {
            if let Some(points) = points {
                for (idx, point) in points.iter().enumerate() {
                    check_json_point(idx, point, &declared_skills, &mut result);
                }
            }
            return result;
        }

        match serde_json::from_value::<MatrixData>(value.clone()) {
            Ok(matrix) => result.merge(self.validate(&matrix)),
            Err(err) => {
                result.error(DiagnosticKind::InvalidShape, format!("not a matrix: {err}"));
                if let Some(points) = points {
                    for (idx, point) in points.iter().enumerate() {
                        check_json_point(idx, point, &declared_skills, &mut result);
                    }
                }
            }
        }
        result
    }
}

fn check_totals(matrix: &MatrixData, result: &mut ValidationResult) {
    if !matrix.total_demand.is_finite() {
        result.error(DiagnosticKind::NonFiniteValue, "total demand is not a finite number");
    }
    for (skill, summary) in &matrix.skill_summary {
        if !summary.total_hours.is_finite() {
            result.error(
                DiagnosticKind::NonFiniteValue,
                format!("summary hours for skill '{skill}' are not a finite number"),
            );
        }
    }
}

fn check_point(
    idx: usize,
    point: &DemandDataPoint,
    skills: &HashSet<&str>,
    months: &HashSet<&str>,
    result: &mut ValidationResult,
) {
    if point.skill_type.trim().is_empty() {
        result.error(
            DiagnosticKind::MalformedDataPoint,
            format!("data point {idx} has an empty skill"),
        );
    } else if !skills.contains(point.skill_type.as_str()) {
        result.error(
            DiagnosticKind::UndeclaredSkill,
            format!(
                "data point {idx} uses skill '{}' which is not declared",
                point.skill_type
            ),
        );
    }

    if !MonthInfo::is_well_formed_key(&point.month) {
        result.error(
            DiagnosticKind::MalformedDataPoint,
            format!("data point {idx} has malformed month '{}'", point.month),
        );
    } else if !months.contains(point.month.as_str()) {
        result.warn(
            DiagnosticKind::UndeclaredMonth,
            format!("data point {idx} month {} is not declared", point.month),
        );
    }

    if !point.demand_hours.is_finite() {
        result.error(
            DiagnosticKind::MalformedDataPoint,
            format!("data point {idx} demand hours are not a finite number"),
        );
    } else if !point.is_consistent(HOURS_TOLERANCE) {
        result.warn(
            DiagnosticKind::InconsistentAggregate,
            format!(
                "cell '{}' {} disagrees with its task breakdown",
                point.skill_type, point.month
            ),
        );
    }

    for entry in &point.task_breakdown {
        let blank_id = entry
            .preferred_staff_id
            .as_deref()
            .is_some_and(|id| id.trim().is_empty());
        let blank_name = entry
            .preferred_staff_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty());
        if blank_id || blank_name {
            result.warn(
                DiagnosticKind::BlankPreferredStaff,
                format!(
                    "task '{}' in cell '{}' {} has a blank preferred staff",
                    entry.recurring_task_id, point.skill_type, point.month
                ),
            );
        }
    }
}

fn check_data_presence(matrix: &MatrixData, result: &mut ValidationResult) {
    if matrix.skills.is_empty() {
        result.warn(DiagnosticKind::NoData, "matrix declares no skills");
    }
    if matrix.data_points.is_empty() {
        result.warn(DiagnosticKind::NoData, "matrix has no data points");
    } else if matrix.data_points.iter().all(|p| p.task_breakdown.is_empty()) {
        result.warn(DiagnosticKind::NoData, "matrix has no task demand");
    }
}

fn require_array<'a>(
    root: &'a Map<String, Value>,
    field: &str,
    result: &mut ValidationResult,
) -> Option<&'a Vec<Value>> {
    match root.get(field) {
        None => {
            result.error(DiagnosticKind::MissingField, format!("missing field '{field}'"));
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            result.error(
                DiagnosticKind::InvalidShape,
                format!("'{field}' must be an array"),
            );
            None
        }
    }
}

fn check_json_point(
    idx: usize,
    point: &Value,
    skills: &HashSet<&str>,
    result: &mut ValidationResult,
) {
    let Some(point) = point.as_object() else {
        result.error(
            DiagnosticKind::MalformedDataPoint,
            format!("data point {idx} is not an object"),
        );
        return;
    };

    match point.get("skillType").and_then(Value::as_str) {
        Some(skill) if !skill.trim().is_empty() => {
            if !skills.contains(skill) {
                result.error(
                    DiagnosticKind::UndeclaredSkill,
                    format!("data point {idx} uses skill '{skill}' which is not declared"),
                );
            }
        }
        _ => result.error(
            DiagnosticKind::MalformedDataPoint,
            format!("data point {idx} has an empty skill"),
        ),
    }

    let month_ok = point
        .get("month")
        .and_then(Value::as_str)
        .is_some_and(MonthInfo::is_well_formed_key);
    if !month_ok {
        result.error(
            DiagnosticKind::MalformedDataPoint,
            format!("data point {idx} has a malformed month"),
        );
    }

    if !point.get("demandHours").is_some_and(Value::is_number) {
        result.error(
            DiagnosticKind::MalformedDataPoint,
            format!("data point {idx} demand hours are not a finite number"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_test_utils::{demand_entry, month};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn matrix() -> MatrixData {
        let jan = month("2025-01");
        MatrixData::from_parts(
            vec![jan.clone()],
            vec!["CPA".to_string()],
            vec![DemandDataPoint::from_breakdown(
                "CPA",
                &jan,
                vec![demand_entry("c1", "t1", "CPA", 4.0)],
            )],
            0,
        )
    }

    #[test]
    fn well_formed_matrix_is_clean() {
        let result = StructuralValidator::new().validate(&matrix());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn undeclared_skill_error_names_it() {
        let mut m = matrix();
        m.data_points[0].skill_type = "Auditor".to_string();
        let result = StructuralValidator::new().validate(&m);
        assert!(!result.is_valid);
        let err = result.errors_of(DiagnosticKind::UndeclaredSkill).next().unwrap();
        assert!(err.message.contains("Auditor"));
    }

    #[test]
    fn tampered_aggregate_is_a_warning() {
        let mut m = matrix();
        m.data_points[0].demand_hours = 99.0;
        let result = StructuralValidator::new().validate(&m);
        assert!(result.is_valid);
        assert!(result.has(DiagnosticKind::InconsistentAggregate));
    }

    #[test]
    fn nan_total_is_an_error() {
        let mut m = matrix();
        m.total_demand = f64::NAN;
        let result = StructuralValidator::new().validate(&m);
        assert!(!result.is_valid);
        assert!(result.has(DiagnosticKind::NonFiniteValue));
    }

    #[test]
    fn malformed_month_and_duplicate_cell() {
        let mut m = matrix();
        let dup = m.data_points[0].clone();
        m.data_points.push(dup);
        let mut bad = m.data_points[0].clone();
        bad.month = "2025-13".to_string();
        m.data_points.push(bad);

        let result = StructuralValidator::new().validate(&m);
        assert!(result.has(DiagnosticKind::DuplicateCell));
        assert_eq!(result.errors_of(DiagnosticKind::MalformedDataPoint).count(), 1);
    }

    #[test]
    fn blank_preferred_staff_warns() {
        let mut m = matrix();
        m.data_points[0].task_breakdown[0].preferred_staff_id = Some("  ".to_string());
        let result = StructuralValidator::new().validate(&m);
        assert!(result.is_valid);
        assert!(result.has(DiagnosticKind::BlankPreferredStaff));
    }

    #[test]
    fn empty_matrix_warns_no_data() {
        let result = StructuralValidator::new().validate(&MatrixData::empty());
        assert!(result.is_valid);
        assert_eq!(result.warnings_of(DiagnosticKind::NoData).count(), 2);
    }

    #[test]
    fn json_round_trip_of_valid_matrix_is_clean() {
        let value = serde_json::to_value(matrix()).unwrap();
        let result = StructuralValidator::new().validate_json(&value);
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn json_missing_arrays_are_errors() {
        let result = StructuralValidator::new().validate_json(&json!({
            "months": [],
            "skills": "CPA",
            "totalDemand": 0,
            "totalTasks": 0,
            "totalClients": 0
        }));
        assert!(!result.is_valid);
        assert_eq!(result.errors_of(DiagnosticKind::MissingField).count(), 2);
        assert!(result.has(DiagnosticKind::InvalidShape));
    }

    #[test]
    fn json_null_hours_are_reported_per_point() {
        let mut value = serde_json::to_value(matrix()).unwrap();
        value["dataPoints"][0]["demandHours"] = Value::Null;
        value["dataPoints"][0]["skillType"] = json!("Tax");
        let result = StructuralValidator::new().validate_json(&value);
        assert!(!result.is_valid);
        assert!(result.has(DiagnosticKind::MalformedDataPoint));
        let err = result.errors_of(DiagnosticKind::UndeclaredSkill).next().unwrap();
        assert!(err.message.contains("Tax"));
    }

    #[test]
    fn json_non_object_root() {
        let result = StructuralValidator::new().validate_json(&json!([1, 2]));
        assert!(!result.is_valid);
        assert!(result.has(DiagnosticKind::InvalidShape));
    }
}
