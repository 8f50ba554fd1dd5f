//! Demand matrix construction
//!
//! Turns task, client and staff records into a skill x month
//! [`MatrixData`]. Each task's monthly hours are computed once per month
//! and credited in full to every skill the task requires.

use crate::error::MatrixResult;
use crate::fill::densify;
use crate::observer::{MatrixObserver, NoopObserver, TaskIssue};
use forecast_core::{
    ingest_staff, ingest_tasks, ClientRecord, ClientTaskDemand, DateRange, DemandDataPoint,
    MatrixData, RecurrenceCalculator, RecurringTask, StaffCapacity,
    StaffCapacityRecord, TaskRecord,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Client name used when a task references an unknown client
pub const UNKNOWN_CLIENT: &str = "Unknown Client";

/// Demand matrix builder
#[derive(Debug, Clone)]
pub struct MatrixTransformer {
    calculator: RecurrenceCalculator,
    observer: Arc<dyn MatrixObserver>,
}

impl MatrixTransformer {
    /// Create transformer with no observer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            calculator: RecurrenceCalculator::new(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// With checkpoint observer
    #[inline]
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn MatrixObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Build the dense matrix
    ///
    /// Every skill/month pair is present; pairs without demand are zero cells.
    /// Fails only when `date_range` is reversed.
    pub fn build_matrix(
        &self,
        tasks: &[TaskRecord],
        clients: &[ClientRecord],
        staff: &[StaffCapacityRecord],
        date_range: &DateRange,
    ) -> MatrixResult<MatrixData> {
        let started = Instant::now();
        let sparse = self.assemble(&ingest_tasks(tasks), clients, &ingest_staff(staff), date_range)?;
        let MatrixData {
            months,
            skills,
            data_points,
            horizon_offset,
            ..
        } = sparse;
        let matrix = densify(data_points, &skills, &months, horizon_offset);
        self.observer.build_completed(&matrix, started.elapsed());
        Ok(matrix)
    }

    /// Build the sparse matrix, omitting cells without demand
    pub fn build_sparse(
        &self,
        tasks: &[TaskRecord],
        clients: &[ClientRecord],
        staff: &[StaffCapacityRecord],
        date_range: &DateRange,
    ) -> MatrixResult<MatrixData> {
        let started = Instant::now();
        let matrix = self.assemble(&ingest_tasks(tasks), clients, &ingest_staff(staff), date_range)?;
        self.observer.build_completed(&matrix, started.elapsed());
        Ok(matrix)
    }

    fn assemble(
        &self,
        tasks: &[RecurringTask],
        clients: &[ClientRecord],
        staff: &[StaffCapacity],
        date_range: &DateRange,
    ) -> MatrixResult<MatrixData> {
        let months = date_range.months()?;
        self.observer.build_started(tasks.len(), months.len());

        let skills = collect_skills(tasks, staff);
        let skill_index: HashMap<&str, usize> = skills
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();
        let names = NameLookup::new(clients, staff);

        let mut cells: BTreeMap<(usize, usize), Vec<ClientTaskDemand>> = BTreeMap::new();
        let mut reported: HashSet<&str> = HashSet::new();

        for (month_idx, month) in months.iter().enumerate() {
            for task in tasks.iter().filter(|t| !t.required_skills.is_empty()) {
                let result = self.calculator.monthly_hours(task, month);
                if let Some(issue) = result.issue {
                    if reported.insert(task.id.as_str()) {
                        self.observer.task_issue(&TaskIssue {
                            task_id: task.id.clone(),
                            client_id: task.client_id.clone(),
                            month: month.key.clone(),
                            issue,
                        });
                    }
                    continue;
                }
                if result.hours <= 0.0 {
                    continue;
                }
                for skill in &task.required_skills {
                    if let Some(&skill_idx) = skill_index.get(skill.as_str()) {
                        cells
                            .entry((skill_idx, month_idx))
                            .or_default()
                            .push(names.demand_entry(task, skill, result.hours));
                    }
                }
            }
        }

        let data_points = cells
            .into_iter()
            .map(|((skill_idx, month_idx), breakdown)| {
                DemandDataPoint::from_breakdown(skills[skill_idx].clone(), &months[month_idx], breakdown)
            })
            .collect();

        Ok(MatrixData::from_parts(months, skills, data_points, 0))
    }
}

impl Default for MatrixTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted union of task and staff skills
fn collect_skills(tasks: &[RecurringTask], staff: &[StaffCapacity]) -> Vec<String> {
    tasks
        .iter()
        .flat_map(|t| t.required_skills.iter())
        .chain(staff.iter().flat_map(|s| s.skills.iter()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Client and staff name resolution for breakdown entries
struct NameLookup<'a> {
    clients: HashMap<&'a str, &'a str>,
    staff: HashMap<&'a str, &'a str>,
}

impl<'a> NameLookup<'a> {
    fn new(clients: &'a [ClientRecord], staff: &'a [StaffCapacity]) -> Self {
        Self {
            clients: clients
                .iter()
                .filter(|c| !c.legal_name.trim().is_empty())
                .map(|c| (c.id.trim(), c.legal_name.trim()))
                .collect(),
            staff: staff
                .iter()
                .filter_map(|s| s.name.as_deref().map(|name| (s.staff_id.as_str(), name)))
                .collect(),
        }
    }

    fn demand_entry(&self, task: &RecurringTask, skill: &str, monthly_hours: f64) -> ClientTaskDemand {
        let preferred_staff_name = task
            .preferred_staff_id
            .as_deref()
            .and_then(|id| self.staff.get(id))
            .map(|name| (*name).to_string());
        ClientTaskDemand {
            client_id: task.client_id.clone(),
            client_name: self
                .clients
                .get(task.client_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_CLIENT)
                .to_string(),
            recurring_task_id: task.id.clone(),
            task_name: task.name.clone(),
            skill_type: skill.to_string(),
            estimated_hours: task.estimated_hours,
            recurrence_pattern: RecurrenceCalculator::pattern(task),
            monthly_hours,
            preferred_staff_id: task.preferred_staff_id.clone(),
            preferred_staff_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatrixError;
    use forecast_core::MonthInfo;
    use std::sync::Mutex;

    fn jan_2025(months: u32) -> DateRange {
        let start = MonthInfo::first_day("2025-01").unwrap();
        DateRange::months_from(start, months)
    }

    fn task(id: &str, client: &str, skills: &[&str], hours: f64, kind: &str) -> TaskRecord {
        TaskRecord {
            id: id.to_string(),
            client_id: client.to_string(),
            name: format!("Task {id}"),
            estimated_hours: Some(hours),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            recurrence_type: Some(kind.to_string()),
            recurrence_interval: Some(1),
            ..TaskRecord::default()
        }
    }

    fn client(id: &str, name: &str) -> ClientRecord {
        ClientRecord {
            id: id.to_string(),
            legal_name: name.to_string(),
            status: Some("active".to_string()),
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        issues: Mutex<Vec<TaskIssue>>,
        started: Mutex<usize>,
        completed: Mutex<usize>,
    }

    impl MatrixObserver for Recorder {
        fn build_started(&self, _tasks: usize, _months: usize) {
            *self.started.lock().unwrap() += 1;
        }

        fn task_issue(&self, issue: &TaskIssue) {
            self.issues.lock().unwrap().push(issue.clone());
        }

        fn build_completed(&self, _matrix: &MatrixData, _elapsed: std::time::Duration) {
            *self.completed.lock().unwrap() += 1;
        }
    }

    #[test]
    fn builds_dense_matrix_with_breakdown() {
        let tasks = vec![
            task("t1", "c1", &["CPA"], 10.0, "Monthly"),
            task("t2", "c2", &["CPA", "Junior"], 2.0, "Weekly"),
        ];
        let clients = vec![client("c1", "Acme Ltd"), client("c2", "Globex")];
        let matrix = MatrixTransformer::new()
            .build_matrix(&tasks, &clients, &[], &jan_2025(3))
            .unwrap();

        assert_eq!(matrix.skills, vec!["CPA", "Junior"]);
        assert_eq!(matrix.months.len(), 3);
        assert_eq!(matrix.data_points.len(), 6);

        let cell = matrix.cell("CPA", "2025-02").unwrap();
        assert_eq!(cell.task_count, 2);
        assert_eq!(cell.client_count, 2);
        assert!((cell.demand_hours - (10.0 + 2.0 * 4.33)).abs() < 1e-9);
        assert_eq!(cell.task_breakdown[0].client_name, "Acme Ltd");

        let junior = matrix.cell("Junior", "2025-01").unwrap();
        assert_eq!(junior.task_count, 1);
        assert_eq!(matrix.total_tasks, 2);
        assert_eq!(matrix.total_clients, 2);
    }

    #[test]
    fn sparse_build_omits_empty_cells() {
        let tasks = vec![task("t1", "c1", &["CPA"], 10.0, "Monthly")];
        let staff = vec![StaffCapacityRecord {
            staff_id: "s1".to_string(),
            assigned_skills: vec!["Junior".to_string()],
            weekly_available_hours: Some(40.0),
            ..StaffCapacityRecord::default()
        }];
        let matrix = MatrixTransformer::new()
            .build_sparse(&tasks, &[], &staff, &jan_2025(2))
            .unwrap();
        assert_eq!(matrix.skills, vec!["CPA", "Junior"]);
        assert_eq!(matrix.data_points.len(), 2);
        assert!(matrix.data_points.iter().all(|p| p.skill_type == "CPA"));
        assert_eq!(matrix.data_points[0].task_breakdown[0].client_name, UNKNOWN_CLIENT);
    }

    #[test]
    fn sparse_build_pairs_start_with_completion() {
        let recorder = Arc::new(Recorder::default());
        let transformer = MatrixTransformer::new().with_observer(recorder.clone());
        let tasks = vec![task("t1", "c1", &["CPA"], 10.0, "Monthly")];

        transformer.build_sparse(&tasks, &[], &[], &jan_2025(2)).unwrap();
        transformer.build_matrix(&tasks, &[], &[], &jan_2025(2)).unwrap();

        assert_eq!(*recorder.started.lock().unwrap(), 2);
        assert_eq!(*recorder.completed.lock().unwrap(), 2);
    }

    #[test]
    fn malformed_task_is_reported_once_and_skipped() {
        let recorder = Arc::new(Recorder::default());
        let tasks = vec![
            task("bad", "c1", &["CPA"], 5.0, "Fortnightly"),
            task("good", "c1", &["CPA"], 5.0, "Monthly"),
        ];
        let matrix = MatrixTransformer::new()
            .with_observer(recorder.clone())
            .build_matrix(&tasks, &[], &[], &jan_2025(12))
            .unwrap();

        assert_eq!(matrix.total_tasks, 1);
        assert!((matrix.total_demand - 60.0).abs() < 1e-9);
        let issues = recorder.issues.lock().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].task_id, "bad");
        assert_eq!(issues[0].month, "2025-01");
        assert_eq!(*recorder.completed.lock().unwrap(), 1);
    }

    #[test]
    fn preferred_staff_name_is_resolved_from_roster() {
        let mut record = task("t1", "c1", &["CPA"], 4.0, "Monthly");
        record.preferred_staff_id = Some("s1".to_string());
        let staff = vec![StaffCapacityRecord {
            staff_id: "s1".to_string(),
            staff_name: Some("Dana Reyes".to_string()),
            assigned_skills: vec!["CPA".to_string()],
            weekly_available_hours: Some(30.0),
        }];
        let matrix = MatrixTransformer::new()
            .build_matrix(&[record], &[], &staff, &jan_2025(1))
            .unwrap();
        let entry = &matrix.data_points[0].task_breakdown[0];
        assert_eq!(entry.preferred_staff_id.as_deref(), Some("s1"));
        assert_eq!(entry.preferred_staff_name.as_deref(), Some("Dana Reyes"));
    }

    #[test]
    fn reversed_range_fails_fast() {
        let start = MonthInfo::first_day("2025-06").unwrap();
        let end = MonthInfo::first_day("2025-01").unwrap();
        let range = DateRange { start, end };
        let result = MatrixTransformer::new().build_matrix(&[], &[], &[], &range);
        assert!(matches!(result, Err(MatrixError::Core(_))));
    }
}
