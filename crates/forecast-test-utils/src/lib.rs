//! Testing utilities for the forecast workspace
//!
//! Shared record fixtures, a hand-built matrix and proptest strategies.

#![allow(missing_docs)]

use chrono::NaiveDate;
use forecast_core::{
    ClientRecord, ClientTaskDemand, DateRange, DemandDataPoint, MatrixData, MonthInfo,
    RecurrencePattern, RecurrenceType, StaffCapacityRecord, TaskRecord,
};
use proptest::prelude::*;

/// January 2025, the first month of every fixture horizon
pub fn horizon_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// `months` consecutive months from [`horizon_start`]
pub fn horizon(months: u32) -> DateRange {
    DateRange::months_from(horizon_start(), months)
}

pub fn month(key: &str) -> MonthInfo {
    MonthInfo::from_key(key).unwrap()
}

pub fn task(id: &str, client: &str, skills: &[&str], hours: f64, recurrence: &str) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        client_id: client.to_string(),
        name: format!("Task {id}"),
        estimated_hours: Some(hours),
        required_skills: skills.iter().map(|s| s.to_string()).collect(),
        recurrence_type: Some(recurrence.to_string()),
        recurrence_interval: Some(1),
        ..TaskRecord::default()
    }
}

pub fn task_for_staff(
    id: &str,
    client: &str,
    skills: &[&str],
    hours: f64,
    staff: &str,
) -> TaskRecord {
    TaskRecord {
        preferred_staff_id: Some(staff.to_string()),
        ..task(id, client, skills, hours, "Monthly")
    }
}

pub fn client(id: &str, name: &str) -> ClientRecord {
    ClientRecord {
        id: id.to_string(),
        legal_name: name.to_string(),
        status: Some("active".to_string()),
    }
}

pub fn staff(id: &str, name: &str, skills: &[&str], weekly: f64) -> StaffCapacityRecord {
    StaffCapacityRecord {
        staff_id: id.to_string(),
        staff_name: Some(name.to_string()),
        assigned_skills: skills.iter().map(|s| s.to_string()).collect(),
        weekly_available_hours: Some(weekly),
    }
}

/// A small firm: three clients, three skills, mixed recurrences
pub fn sample_tasks() -> Vec<TaskRecord> {
    vec![
        task_for_staff("t-bookkeeping", "c-acme", &["Junior"], 12.0, "s-ana"),
        task("t-payroll", "c-acme", &["Junior"], 2.0, "Weekly"),
        task("t-vat", "c-globex", &["Senior"], 6.0, "Quarterly"),
        task("t-annual", "c-globex", &["CPA", "Senior"], 40.0, "Annually"),
        task_for_staff("t-review", "c-initech", &["CPA"], 8.0, "s-bo"),
        TaskRecord {
            is_active: false,
            ..task("t-archived", "c-initech", &["CPA"], 100.0, "Monthly")
        },
    ]
}

pub fn sample_clients() -> Vec<ClientRecord> {
    vec![
        client("c-acme", "Acme Ltd"),
        client("c-globex", "Globex Corporation"),
        client("c-initech", "Initech"),
    ]
}

pub fn sample_staff() -> Vec<StaffCapacityRecord> {
    vec![
        staff("s-ana", "Ana", &["Junior"], 40.0),
        staff("s-bo", "Bo", &["CPA", "Senior"], 36.0),
        staff("s-cy", "Cy", &["Senior"], 20.0),
    ]
}

pub fn demand_entry(client: &str, task: &str, skill: &str, hours: f64) -> ClientTaskDemand {
    ClientTaskDemand {
        client_id: client.to_string(),
        client_name: client.to_string(),
        recurring_task_id: task.to_string(),
        task_name: task.to_string(),
        skill_type: skill.to_string(),
        estimated_hours: hours,
        recurrence_pattern: RecurrencePattern {
            kind: RecurrenceType::Monthly,
            interval: 1,
            frequency: 1.0,
        },
        monthly_hours: hours,
        preferred_staff_id: None,
        preferred_staff_name: None,
    }
}

/// Dense 2 skill x 3 month matrix built without the transformer
pub fn sample_matrix() -> MatrixData {
    let months: Vec<MonthInfo> = ["2025-01", "2025-02", "2025-03"].iter().map(|k| month(k)).collect();
    let skills = vec!["CPA".to_string(), "Junior".to_string()];
    let mut points = Vec::new();
    for skill in &skills {
        for m in &months {
            points.push(DemandDataPoint::from_breakdown(
                skill.clone(),
                m,
                vec![
                    demand_entry("c1", &format!("{skill}-a"), skill, 5.0),
                    demand_entry("c2", &format!("{skill}-b"), skill, 2.5),
                ],
            ));
        }
    }
    MatrixData::from_parts(months, skills, points, 0)
}

/// Strategies for generating records
pub mod strategies {
    use super::*;

    pub const SKILLS: [&str; 4] = ["CPA", "Senior", "Junior", "Manager"];
    pub const CLIENTS: [&str; 3] = ["c1", "c2", "c3"];
    pub const RECURRENCES: [&str; 9] = [
        "Daily", "Weekly", "Monthly", "Quarterly", "Annually", "None", "Custom", "Fortnightly", "",
    ];

    pub fn skill_set() -> impl Strategy<Value = Vec<String>> {
        prop::sample::subsequence(SKILLS.to_vec(), 0..=SKILLS.len())
            .prop_map(|skills| skills.into_iter().map(str::to_string).collect())
    }

    pub fn task_record() -> impl Strategy<Value = TaskRecord> {
        (
            "t[0-9]{1,3}",
            prop::sample::select(CLIENTS.to_vec()),
            skill_set(),
            prop::option::of(-5.0f64..80.0),
            prop::sample::select(RECURRENCES.to_vec()),
            prop::option::of(-1i64..6),
            prop::option::of(prop::sample::select(vec!["s1", "S1 ", "s2"])),
            any::<bool>(),
        )
            .prop_map(
                |(id, client, skills, hours, recurrence, interval, staff, active)| TaskRecord {
                    name: format!("Task {id}"),
                    id,
                    client_id: client.to_string(),
                    estimated_hours: hours,
                    required_skills: skills,
                    recurrence_type: Some(recurrence.to_string()),
                    recurrence_interval: interval,
                    preferred_staff_id: staff.map(str::to_string),
                    is_active: active,
                    custom_monthly_hours: Some(7.5),
                    ..TaskRecord::default()
                },
            )
    }

    pub fn task_records() -> impl Strategy<Value = Vec<TaskRecord>> {
        prop::collection::vec(task_record(), 0..24)
    }

    pub fn staff_records() -> impl Strategy<Value = Vec<StaffCapacityRecord>> {
        prop::collection::vec(
            ("s[0-9]", skill_set(), prop::option::of(0.0f64..45.0)).prop_map(
                |(id, skills, weekly)| StaffCapacityRecord {
                    staff_name: Some(format!("Staff {id}")),
                    staff_id: id,
                    assigned_skills: skills,
                    weekly_available_hours: weekly,
                },
            ),
            0..5,
        )
    }
}
