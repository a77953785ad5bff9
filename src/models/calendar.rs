//! Production calendar.
//!
//! Encodes which dates a line cannot work: holidays, weekly off-days, and
//! (optionally) every date before a planning cutoff. The allocator never
//! consults the calendar itself; the board turns blocked dates into
//! zero-capacity days before allocating.
//!
//! # Precedence
//! A date is blocked iff any of the following holds:
//! - It precedes `not_before`.
//! - Its weekday is in `weekly_off_days`.
//! - It is listed in `holidays`.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Calendar policy predicate.
pub trait BlockedDates {
    /// Whether no production may be planned on `date`.
    fn is_blocked(&self, date: NaiveDate) -> bool;
}

impl<F> BlockedDates for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_blocked(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Factory calendar: holidays plus weekly off-days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionCalendar {
    /// Calendar identifier.
    pub id: String,
    /// Individually blocked dates.
    pub holidays: BTreeSet<NaiveDate>,
    /// Weekdays the factory does not run.
    pub weekly_off_days: Vec<Weekday>,
    /// Dates before this one are blocked (past days on the board).
    pub not_before: Option<NaiveDate>,
}

impl ProductionCalendar {
    /// Creates a calendar with nothing blocked.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Blocks a single date.
    pub fn with_holiday(mut self, date: NaiveDate) -> Self {
        self.holidays.insert(date);
        self
    }

    /// Blocks a weekday every week.
    pub fn with_weekly_off(mut self, day: Weekday) -> Self {
        if !self.weekly_off_days.contains(&day) {
            self.weekly_off_days.push(day);
        }
        self
    }

    /// Blocks every date before `date`.
    pub fn with_not_before(mut self, date: NaiveDate) -> Self {
        self.not_before = Some(date);
        self
    }

    /// Working (unblocked) dates in `[start, end]`.
    pub fn working_days(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !self.is_blocked(*d))
            .collect()
    }

    /// First working date at or after `from`, searching at most `horizon_days`.
    pub fn next_working_day(&self, from: NaiveDate, horizon_days: usize) -> Option<NaiveDate> {
        from.iter_days()
            .take(horizon_days)
            .find(|d| !self.is_blocked(*d))
    }
}

impl BlockedDates for ProductionCalendar {
    fn is_blocked(&self, date: NaiveDate) -> bool {
        if matches!(self.not_before, Some(cutoff) if date < cutoff) {
            return true;
        }
        self.weekly_off_days.contains(&date.weekday()) || self.holidays.contains(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn test_empty_calendar_blocks_nothing() {
        let cal = ProductionCalendar::new("open");
        assert!(!cal.is_blocked(d(1, 1)));
        assert!(!cal.is_blocked(d(12, 31)));
    }

    #[test]
    fn test_weekly_off_and_holiday() {
        // 2024-03-01 is a Friday
        let cal = ProductionCalendar::new("factory")
            .with_weekly_off(Weekday::Sun)
            .with_holiday(d(3, 1));

        assert!(cal.is_blocked(d(3, 1))); // holiday
        assert!(!cal.is_blocked(d(3, 2))); // Saturday works
        assert!(cal.is_blocked(d(3, 3))); // Sunday
        assert!(!cal.is_blocked(d(3, 4)));
    }

    #[test]
    fn test_not_before_cutoff() {
        let cal = ProductionCalendar::new("board").with_not_before(d(3, 10));
        assert!(cal.is_blocked(d(3, 9)));
        assert!(!cal.is_blocked(d(3, 10)));
    }

    #[test]
    fn test_working_days_and_next() {
        let cal = ProductionCalendar::new("factory")
            .with_weekly_off(Weekday::Sun)
            .with_holiday(d(3, 4));

        let days = cal.working_days(d(3, 2), d(3, 5));
        assert_eq!(days, vec![d(3, 2), d(3, 5)]);

        assert_eq!(cal.next_working_day(d(3, 3), 10), Some(d(3, 5)));
        assert_eq!(cal.next_working_day(d(3, 3), 1), None);
    }

    #[test]
    fn test_closure_predicate() {
        let even_days_off = |date: NaiveDate| date.day() % 2 == 0;
        assert!(even_days_off.is_blocked(d(3, 2)));
        assert!(!even_days_off.is_blocked(d(3, 3)));
    }
}
