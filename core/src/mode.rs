//! Temporal mode selection.
//!
//! The single branch point of the engine. No range means Pipeline mode
//! (classify households by current status); a range means Activity mode
//! (classify by event dates, status ignored). Everything downstream
//! matches on ReportMode / FunnelData instead of re-checking the range.

use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive, day-granularity date range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AnalyticsResult<Self> {
        if start > end {
            return Err(AnalyticsError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// First day of the month containing `start`. Ledger months on or
    /// after this day, and not after `end`, overlap the range.
    pub fn first_month(&self) -> NaiveDate {
        self.start.with_day(1).unwrap_or(self.start)
    }

    /// Month-granularity overlap test for spend ledger entries.
    pub fn overlaps_month(&self, month: NaiveDate) -> bool {
        let month_start = month.with_day(1).unwrap_or(month);
        self.first_month() <= month_start && month_start <= self.end
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReportMode {
    /// Snapshot keyed by each household's current status.
    Pipeline,
    /// Window keyed by lead, quote and sale event dates.
    Activity { range: DateRange },
}

impl ReportMode {
    pub fn select(range: Option<DateRange>) -> Self {
        match range {
            None => Self::Pipeline,
            Some(range) => Self::Activity { range },
        }
    }

    pub fn range(&self) -> Option<DateRange> {
        match self {
            Self::Pipeline => None,
            Self::Activity { range } => Some(*range),
        }
    }

    pub fn is_activity(&self) -> bool {
        matches!(self, Self::Activity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(d(2024, 3, 10), d(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDateRange { .. }));
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let range = DateRange::new(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
        assert!(range.contains(d(2024, 3, 1)));
        assert!(range.contains(d(2024, 3, 31)));
        assert!(!range.contains(d(2024, 4, 1)));
        assert!(!range.contains(d(2024, 2, 29)));
    }

    #[test]
    fn mid_month_range_overlaps_its_ledger_months() {
        let range = DateRange::new(d(2024, 3, 15), d(2024, 5, 2)).unwrap();
        assert!(range.overlaps_month(d(2024, 3, 1)));
        assert!(range.overlaps_month(d(2024, 5, 1)));
        assert!(!range.overlaps_month(d(2024, 2, 1)));
        assert!(!range.overlaps_month(d(2024, 6, 1)));
    }

    #[test]
    fn absent_range_selects_pipeline() {
        assert_eq!(ReportMode::select(None), ReportMode::Pipeline);
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        assert_eq!(ReportMode::select(Some(range)).range(), Some(range));
    }
}
