//! Matrix filtering
//!
//! Filtering never trusts the aggregates stored on a cell. Each retained
//! cell is rebuilt from its filtered task breakdown, then the matrix totals
//! are rebuilt from the cells and the result is densified onto the effective
//! skills x month window.
//!
//! Month ranges are horizon positions: a filtered matrix remembers where
//! its first month sits in the original horizon, so filtering it again with
//! the same configuration selects the same months.

use crate::fill::densify;
use crate::observer::{MatrixObserver, NoopObserver};
use crate::report::PerformanceReport;
use forecast_core::{
    normalize_reference, ClientTaskDemand, DemandDataPoint, FilterConfig, MatrixData,
    MonthRange, PreferredStaffFilterMode,
};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

/// Filter engine
#[derive(Debug, Clone)]
pub struct MatrixFilterEngine {
    observer: Arc<dyn MatrixObserver>,
}

impl MatrixFilterEngine {
    /// Create engine with no observer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
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

    /// Filter `matrix`, returning a new matrix
    ///
    /// The input is only read; the output owns all of its data.
    #[must_use]
    pub fn apply_filter(&self, matrix: &MatrixData, config: &FilterConfig) -> MatrixData {
        let skills = effective_skills(matrix, config);
        let (window, horizon_offset) = month_window(matrix, config.month_range);
        let months = matrix.months[window].to_vec();

        let skill_set: HashSet<&str> = skills.iter().map(String::as_str).collect();
        let month_set: HashSet<&str> = months.iter().map(|m| m.key.as_str()).collect();
        let clients = ClientFilter::new(&config.selected_clients);
        let staff = StaffFilter::new(config);

        let keep = |entry: &ClientTaskDemand| {
            skill_set.contains(entry.skill_type.as_str())
                && clients.matches(entry)
                && staff.matches(entry)
        };

        let points: Vec<DemandDataPoint> = matrix
            .data_points
            .iter()
            .filter(|p| skill_set.contains(p.skill_type.as_str()) && month_set.contains(p.month.as_str()))
            .map(|p| {
                let breakdown = p.task_breakdown.iter().filter(|e| keep(*e)).cloned().collect();
                DemandDataPoint::from_breakdown(p.skill_type.clone(), &p.month_info(), breakdown)
            })
            .collect();

        let filtered = densify(points, &skills, &months, horizon_offset);
        self.observer
            .filter_applied(&PerformanceReport::new(matrix, &filtered, config));
        filtered
    }
}

impl Default for MatrixFilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Selected skills in matrix order, or every skill when none are selected
fn effective_skills(matrix: &MatrixData, config: &FilterConfig) -> Vec<String> {
    if config.selected_skills.is_empty() {
        return matrix.skills.clone();
    }
    let selected: HashSet<&str> = config.selected_skills.iter().map(|s| s.trim()).collect();
    matrix
        .skills
        .iter()
        .filter(|s| selected.contains(s.as_str()))
        .cloned()
        .collect()
}

/// Local index range and horizon offset of the requested month window
///
/// Positions outside the matrix clamp to its first or last month; a
/// reversed range is read in ascending order.
fn month_window(matrix: &MatrixData, range: MonthRange) -> (Range<usize>, usize) {
    let len = matrix.months.len();
    if len == 0 {
        return (0..0, matrix.horizon_offset);
    }
    let first = matrix.horizon_offset;
    let last = first.saturating_add(len - 1);
    let (lo, hi) = if range.start <= range.end {
        (range.start, range.end)
    } else {
        (range.end, range.start)
    };
    let lo = lo.clamp(first, last);
    let hi = hi.clamp(first, last);
    ((lo - first)..(hi - first + 1), lo)
}

/// Client membership; an empty selection admits every client
struct ClientFilter<'a> {
    selected: Option<HashSet<&'a str>>,
}

impl<'a> ClientFilter<'a> {
    fn new(selected: &'a [String]) -> Self {
        Self {
            selected: (!selected.is_empty()).then(|| selected.iter().map(|c| c.trim()).collect()),
        }
    }

    fn matches(&self, entry: &ClientTaskDemand) -> bool {
        self.selected
            .as_ref()
            .map_or(true, |set| set.contains(entry.client_id.trim()))
    }
}

/// Preferred staff rule for one filter mode
enum StaffFilter {
    All,
    Specific(HashSet<String>),
    Unassigned,
}

impl StaffFilter {
    fn new(config: &FilterConfig) -> Self {
        match config.preferred_staff_filter_mode {
            PreferredStaffFilterMode::All => Self::All,
            PreferredStaffFilterMode::Specific => Self::Specific(
                config
                    .selected_preferred_staff
                    .iter()
                    .filter_map(|id| normalize_reference(Some(id.as_str())))
                    .collect(),
            ),
            PreferredStaffFilterMode::None => Self::Unassigned,
        }
    }

    fn matches(&self, entry: &ClientTaskDemand) -> bool {
        // Trimmed, otherwise exact
        let key = normalize_reference(entry.preferred_staff_id.as_deref());
        match self {
            Self::All => true,
            Self::Specific(selected) => key.map_or(false, |k| selected.contains(&k)),
            Self::Unassigned => key.is_none(),
        }
    }
}
