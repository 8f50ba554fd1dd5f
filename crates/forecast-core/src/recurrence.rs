//! Recurrence to monthly hours
//!
//! Every recurring task is reduced to an average number of occurrences per
//! month, multiplied by its estimated hours. Malformed tasks contribute zero
//! hours and carry a [`RecurrenceIssue`] instead of failing.

use crate::month::MonthInfo;
use crate::records::RecurringTask;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Average weeks per calendar month
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// Working-day approximation for daily tasks
pub const DAYS_PER_MONTH: f64 = 30.0;

/// How often a task recurs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecurrenceType {
    /// Not recurring
    None,
    /// Every `interval` days
    Daily,
    /// Every `interval` weeks
    Weekly,
    /// Every `interval` months
    Monthly,
    /// Every `interval` quarters
    Quarterly,
    /// Every `interval` years
    Annually,
    /// Explicit monthly hours supplied by the caller
    Custom,
    /// Anything else found in the source record
    Unrecognized(String),
}

impl RecurrenceType {
    /// Canonical name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "None",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annually => "Annually",
            Self::Custom => "Custom",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Occurrences per month at interval 1
    ///
    /// `None` for types that are not frequency driven.
    #[inline]
    #[must_use]
    pub fn base_frequency(&self) -> Option<f64> {
        match self {
            Self::None => Some(0.0),
            Self::Daily => Some(DAYS_PER_MONTH),
            Self::Weekly => Some(WEEKS_PER_MONTH),
            Self::Monthly => Some(1.0),
            Self::Quarterly => Some(1.0 / 3.0),
            Self::Annually => Some(1.0 / 12.0),
            Self::Custom | Self::Unrecognized(_) => None,
        }
    }
}

impl From<&str> for RecurrenceType {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "once" | "one-time" => Self::None,
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            "annually" | "yearly" => Self::Annually,
            "custom" => Self::Custom,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }
}

impl From<String> for RecurrenceType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<RecurrenceType> for String {
    fn from(kind: RecurrenceType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence as carried on a task breakdown entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    /// Recurrence type
    #[serde(rename = "type")]
    pub kind: RecurrenceType,
    /// Interval in units of `kind`
    pub interval: i64,
    /// Occurrences per month implied by type and interval
    pub frequency: f64,
}

/// Why a task contributed zero hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecurrenceIssue {
    /// Recurrence type not understood
    UnknownRecurrenceType(String),
    /// Interval below one
    InvalidInterval(i64),
    /// Estimated hours NaN or infinite
    NonFiniteHours,
    /// Custom recurrence without usable monthly hours
    MissingCustomHours,
}

impl fmt::Display for RecurrenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRecurrenceType(raw) => write!(f, "unknown recurrence type '{raw}'"),
            Self::InvalidInterval(interval) => {
                write!(f, "recurrence interval {interval} is below 1")
            }
            Self::NonFiniteHours => f.write_str("estimated hours are not a finite number"),
            Self::MissingCustomHours => {
                f.write_str("custom recurrence without explicit monthly hours")
            }
        }
    }
}

/// Result of a monthly hours calculation
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyHours {
    /// Hours contributed to the month, never negative
    pub hours: f64,
    /// Occurrences per month used for the calculation
    pub frequency: f64,
    /// Set when the task was degraded to zero
    pub issue: Option<RecurrenceIssue>,
}

impl MonthlyHours {
    #[inline]
    fn zero() -> Self {
        Self {
            hours: 0.0,
            frequency: 0.0,
            issue: None,
        }
    }

    #[inline]
    fn degraded(issue: RecurrenceIssue) -> Self {
        Self {
            issue: Some(issue),
            ..Self::zero()
        }
    }
}

/// Recurrence calculator
///
/// Stateless; monthly hours are `estimated_hours * frequency`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceCalculator;

impl RecurrenceCalculator {
    /// Create new calculator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Occurrences per month for a type and interval
    ///
    /// `None` when the interval is below one or the type has no frequency.
    #[must_use]
    pub fn frequency(kind: &RecurrenceType, interval: i64) -> Option<f64> {
        if interval < 1 {
            return None;
        }
        kind.base_frequency().map(|base| base / interval as f64)
    }

    /// Hours `task` contributes to `month`
    ///
    /// Months outside the task's active window contribute nothing.
    #[must_use]
    pub fn monthly_hours(&self, task: &RecurringTask, month: &MonthInfo) -> MonthlyHours {
        if !task.is_active_in(month) {
            return MonthlyHours::zero();
        }

        match &task.recurrence {
            RecurrenceType::Unrecognized(raw) => {
                return MonthlyHours::degraded(RecurrenceIssue::UnknownRecurrenceType(
                    raw.clone(),
                ));
            }
            RecurrenceType::Custom => return Self::custom_hours(task),
            _ => {}
        }

        if !task.estimated_hours.is_finite() {
            return MonthlyHours::degraded(RecurrenceIssue::NonFiniteHours);
        }
        if task.estimated_hours <= 0.0 {
            return MonthlyHours::zero();
        }

        match Self::frequency(&task.recurrence, task.interval) {
            Some(frequency) => {
                let hours = task.estimated_hours * frequency;
                if !hours.is_finite() {
                    return MonthlyHours::degraded(RecurrenceIssue::NonFiniteHours);
                }
                MonthlyHours {
                    hours,
                    frequency,
                    issue: None,
                }
            }
            None => MonthlyHours::degraded(RecurrenceIssue::InvalidInterval(task.interval)),
        }
    }

    /// Pattern descriptor for a breakdown entry
    #[must_use]
    pub fn pattern(task: &RecurringTask) -> RecurrencePattern {
        RecurrencePattern {
            kind: task.recurrence.clone(),
            interval: task.interval,
            frequency: Self::frequency(&task.recurrence, task.interval).unwrap_or(0.0),
        }
    }

    fn custom_hours(task: &RecurringTask) -> MonthlyHours {
        match task.custom_monthly_hours {
            Some(hours) if hours.is_finite() && hours >= 0.0 => MonthlyHours {
                hours,
                frequency: 0.0,
                issue: None,
            },
            _ => MonthlyHours::degraded(RecurrenceIssue::MissingCustomHours),
        }
    }
}
