//! Pre-build checks on raw records
//!
//! These mirror the degradations the transformer applies silently, so a
//! caller can see which records will contribute nothing before building.
//! Inactive tasks are only checked for duplicate ids.

use crate::diagnostic::{DiagnosticKind, ValidationResult};
use crate::matrix::StructuralValidator;
use forecast_core::{ClientRecord, RecurrenceType, StaffCapacityRecord, TaskRecord};
use std::collections::{HashMap, HashSet};

impl StructuralValidator {
    /// Validate raw task, client and staff records
    #[must_use]
    pub fn validate_records(
        &self,
        tasks: &[TaskRecord],
        clients: &[ClientRecord],
        staff: &[StaffCapacityRecord],
    ) -> ValidationResult {
        let mut result = ValidationResult::new();
        let known_clients: HashSet<&str> = clients.iter().map(|c| c.id.trim()).collect();

        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for task in tasks {
            *occurrences.entry(task.id.trim()).or_default() += 1;
        }
        let mut duplicates: Vec<(&str, usize)> =
            occurrences.into_iter().filter(|(_, n)| *n > 1).collect();
        duplicates.sort_unstable();
        for (id, count) in duplicates {
            result.error(
                DiagnosticKind::DuplicateTaskId,
                format!("task id '{id}' appears {count} times"),
            );
        }

        for task in tasks.iter().filter(|t| t.is_active) {
            check_task(task, &known_clients, &mut result);
        }
        for member in staff {
            check_staff(member, &mut result);
        }

        tracing::debug!(
            tasks = tasks.len(),
            clients = clients.len(),
            staff = staff.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "records validated"
        );
        result
    }
}

fn check_task(task: &TaskRecord, clients: &HashSet<&str>, result: &mut ValidationResult) {
    let id = task.id.trim();
    let recurrence = task
        .recurrence_type
        .as_deref()
        .map_or(RecurrenceType::None, RecurrenceType::from);

    if let RecurrenceType::Unrecognized(raw) = &recurrence {
        result.warn(
            DiagnosticKind::UnknownRecurrenceType,
            format!("task '{id}' has unknown recurrence type '{raw}'"),
        );
    }

    if let Some(interval) = task.recurrence_interval.filter(|i| *i < 1) {
        result.warn(
            DiagnosticKind::InvalidInterval,
            format!("task '{id}' has recurrence interval {interval}"),
        );
    }

    if recurrence == RecurrenceType::Custom {
        if !task
            .custom_monthly_hours
            .is_some_and(|h| h.is_finite() && h >= 0.0)
        {
            result.warn(
                DiagnosticKind::InvalidHours,
                format!("task '{id}' is custom but has no usable monthly hours"),
            );
        }
    } else {
        match task.estimated_hours {
            None => result.warn(
                DiagnosticKind::InvalidHours,
                format!("task '{id}' has no estimated hours"),
            ),
            Some(hours) if !hours.is_finite() || hours < 0.0 => result.warn(
                DiagnosticKind::InvalidHours,
                format!("task '{id}' has invalid estimated hours {hours}"),
            ),
            Some(_) => {}
        }
    }

    if !clients.contains(task.client_id.trim()) {
        result.warn(
            DiagnosticKind::UnknownClient,
            format!("task '{id}' references unknown client '{}'", task.client_id),
        );
    }

    if task.required_skills.iter().all(|s| s.trim().is_empty()) {
        result.warn(
            DiagnosticKind::MissingSkills,
            format!("task '{id}' requires no skills"),
        );
    }

    if task
        .preferred_staff_id
        .as_deref()
        .is_some_and(|s| s.trim().is_empty())
    {
        result.warn(
            DiagnosticKind::BlankPreferredStaff,
            format!("task '{id}' has a blank preferred staff id"),
        );
    }
}

fn check_staff(member: &StaffCapacityRecord, result: &mut ValidationResult) {
    if let Some(hours) = member
        .weekly_available_hours
        .filter(|h| !h.is_finite() || *h < 0.0)
    {
        result.warn(
            DiagnosticKind::NegativeCapacity,
            format!(
                "staff '{}' has invalid weekly hours {hours}",
                member.staff_id.trim()
            ),
        );
    }
    if member.assigned_skills.iter().all(|s| s.trim().is_empty()) {
        result.warn(
            DiagnosticKind::MissingSkills,
            format!("staff '{}' has no assigned skills", member.staff_id.trim()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            client_id: "c1".to_string(),
            name: "Payroll".to_string(),
            estimated_hours: Some(3.0),
            required_skills: vec!["Junior".to_string()],
            recurrence_type: Some("Monthly".to_string()),
            ..TaskRecord::default()
        }
    }

    fn clients() -> Vec<ClientRecord> {
        vec![ClientRecord {
            id: "c1".to_string(),
            legal_name: "Acme".to_string(),
            status: None,
        }]
    }

    #[test]
    fn clean_records_produce_no_findings() {
        let result = StructuralValidator::new().validate_records(&[task("t1")], &clients(), &[]);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn duplicate_ids_are_errors() {
        let tasks = vec![task("t1"), task(" t1 "), task("t2")];
        let result = StructuralValidator::new().validate_records(&tasks, &clients(), &[]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.contains("'t1' appears 2 times"));
    }

    #[test]
    fn degraded_tasks_warn() {
        let tasks = vec![
            TaskRecord {
                recurrence_type: Some("Fortnightly".to_string()),
                ..task("t1")
            },
            TaskRecord {
                recurrence_interval: Some(0),
                ..task("t2")
            },
            TaskRecord {
                estimated_hours: Some(-1.0),
                ..task("t3")
            },
            TaskRecord {
                client_id: "ghost".to_string(),
                ..task("t4")
            },
            TaskRecord {
                required_skills: vec![" ".to_string()],
                ..task("t5")
            },
            TaskRecord {
                preferred_staff_id: Some(String::new()),
                ..task("t6")
            },
            TaskRecord {
                recurrence_type: Some("custom".to_string()),
                ..task("t7")
            },
        ];
        let result = StructuralValidator::new().validate_records(&tasks, &clients(), &[]);
        assert!(result.is_valid);
        for kind in [
            DiagnosticKind::UnknownRecurrenceType,
            DiagnosticKind::InvalidInterval,
            DiagnosticKind::UnknownClient,
            DiagnosticKind::MissingSkills,
            DiagnosticKind::BlankPreferredStaff,
        ] {
            assert_eq!(result.warnings_of(kind).count(), 1, "{kind:?}");
        }
        assert_eq!(result.warnings_of(DiagnosticKind::InvalidHours).count(), 2);
    }

    #[test]
    fn inactive_tasks_are_not_checked() {
        let tasks = vec![TaskRecord {
            is_active: false,
            client_id: "ghost".to_string(),
            ..task("t1")
        }];
        let result = StructuralValidator::new().validate_records(&tasks, &clients(), &[]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn negative_staff_hours_warn() {
        let staff = vec![StaffCapacityRecord {
            staff_id: "s1".to_string(),
            staff_name: None,
            assigned_skills: vec!["CPA".to_string()],
            weekly_available_hours: Some(-4.0),
        }];
        let result = StructuralValidator::new().validate_records(&[], &[], &staff);
        assert_eq!(result.warnings_of(DiagnosticKind::NegativeCapacity).count(), 1);
    }
}
