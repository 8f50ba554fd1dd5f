//! Month axis of the forecast matrix
//!
//! Months are keyed `YYYY-MM`, which sorts chronologically as plain text.

use crate::error::{CoreError, CoreResult};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One column of the matrix
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthInfo {
    /// `YYYY-MM` key, unique within a matrix
    pub key: String,
    /// Display label, e.g. `Jan 2025`
    pub label: String,
}

impl MonthInfo {
    /// Month containing `date`
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            key: date.format("%Y-%m").to_string(),
            label: date.format("%b %Y").to_string(),
        }
    }

    /// Parse a `YYYY-MM` key
    pub fn from_key(key: &str) -> CoreResult<Self> {
        Self::first_day(key).map(Self::from_date)
    }

    /// First calendar day of the month named by `key`
    pub fn first_day(key: &str) -> CoreResult<NaiveDate> {
        if !Self::is_well_formed_key(key) {
            return Err(CoreError::InvalidMonthKey(key.to_string()));
        }
        NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
            .map_err(|_| CoreError::InvalidMonthKey(key.to_string()))
    }

    /// Check the key shape: four digit year, dash, month 01-12
    #[must_use]
    pub fn is_well_formed_key(key: &str) -> bool {
        let bytes = key.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return false;
        }
        if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
            return false;
        }
        matches!(key[5..].parse::<u32>(), Ok(1..=12))
    }
}

/// Inclusive span of calendar months
///
/// Only the year and month of `start`/`end` matter; days are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// Any day in the first month
    pub start: NaiveDate,
    /// Any day in the last month
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a validated range
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        let range = Self { start, end };
        range.check()?;
        Ok(range)
    }

    /// `count` consecutive months starting with the month of `start`
    ///
    /// A count of zero is treated as one month.
    #[must_use]
    pub fn months_from(start: NaiveDate, count: u32) -> Self {
        let first = first_of_month(start);
        let end = first
            .checked_add_months(Months::new(count.max(1) - 1))
            .unwrap_or(NaiveDate::MAX);
        Self { start: first, end }
    }

    /// Number of months covered
    #[must_use]
    pub fn month_count(&self) -> usize {
        if self.end < self.start {
            return 0;
        }
        let years = self.end.year() - self.start.year();
        let months = years * 12 + self.end.month() as i32 - self.start.month() as i32;
        usize::try_from(months + 1).unwrap_or(0)
    }

    /// Enumerate months chronologically
    pub fn months(&self) -> CoreResult<Vec<MonthInfo>> {
        self.check()?;
        let last = first_of_month(self.end);
        let mut cursor = first_of_month(self.start);
        let mut months = Vec::with_capacity(self.month_count());
        while cursor <= last {
            months.push(MonthInfo::from_date(cursor));
            match cursor.checked_add_months(Months::new(1)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        Ok(months)
    }

    fn check(&self) -> CoreResult<()> {
        if first_of_month(self.end) < first_of_month(self.start) {
            return Err(CoreError::invalid_date_range(self.start, self.end));
        }
        Ok(())
    }
}

#[inline]
fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_info_from_date() {
        let month = MonthInfo::from_date(date(2025, 3, 17));
        assert_eq!(month.key, "2025-03");
        assert_eq!(month.label, "Mar 2025");
    }

    #[test]
    fn twelve_months_cross_year_boundary() {
        let range = DateRange::months_from(date(2025, 7, 15), 12);
        let months = range.months().unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].key, "2025-07");
        assert_eq!(months[5].key, "2025-12");
        assert_eq!(months[6].key, "2026-01");
        assert_eq!(months[11].key, "2026-06");
        assert_eq!(range.month_count(), 12);
    }

    #[test]
    fn month_keys_sort_chronologically() {
        let months = DateRange::months_from(date(2024, 11, 1), 4).months().unwrap();
        let mut keys: Vec<_> = months.iter().map(|m| m.key.clone()).collect();
        let original = keys.clone();
        keys.sort();
        assert_eq!(keys, original);
    }

    #[test]
    fn single_month_range() {
        let range = DateRange::new(date(2025, 2, 3), date(2025, 2, 27)).unwrap();
        assert_eq!(range.months().unwrap().len(), 1);
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(DateRange::new(date(2025, 5, 1), date(2025, 4, 30)).is_err());

        let reversed = DateRange {
            start: date(2025, 5, 1),
            end: date(2025, 1, 1),
        };
        assert!(matches!(
            reversed.months(),
            Err(CoreError::InvalidDateRange { .. })
        ));
        assert_eq!(reversed.month_count(), 0);
    }

    #[test]
    fn zero_count_is_one_month() {
        let range = DateRange::months_from(date(2025, 1, 9), 0);
        assert_eq!(range.months().unwrap().len(), 1);
    }

    #[test]
    fn key_shape_checks() {
        assert!(MonthInfo::is_well_formed_key("2025-01"));
        assert!(MonthInfo::is_well_formed_key("1999-12"));
        assert!(!MonthInfo::is_well_formed_key("2025-13"));
        assert!(!MonthInfo::is_well_formed_key("2025-00"));
        assert!(!MonthInfo::is_well_formed_key("2025-1"));
        assert!(!MonthInfo::is_well_formed_key("2025/01"));
        assert!(!MonthInfo::is_well_formed_key(""));
    }

    #[test]
    fn from_key_round_trips_label() {
        let month = MonthInfo::from_key("2026-09").unwrap();
        assert_eq!(month.label, "Sep 2026");
        assert!(MonthInfo::from_key("Sep 2026").is_err());
    }
}
