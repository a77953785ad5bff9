//! Discretized board timeline.
//!
//! Maps calendar dates (day view) or date-times (hour view) onto the
//! integer index space consumed by the stack resolver. Index 0 is the
//! first slot of the timeline origin; dates before the origin map to
//! negative indices.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Board view granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ViewMode {
    /// One slot per calendar day.
    #[default]
    Day,
    /// `slots_per_day` hour slots per calendar day.
    Hour { slots_per_day: u32 },
}

impl ViewMode {
    /// Slots that make up one calendar day.
    pub fn slots_per_day(&self) -> i64 {
        match self {
            ViewMode::Day => 1,
            ViewMode::Hour { slots_per_day } => i64::from((*slots_per_day).max(1)),
        }
    }
}

/// A timeline anchored at an origin date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub origin: NaiveDate,
    pub mode: ViewMode,
}

impl Timeline {
    pub fn new(origin: NaiveDate, mode: ViewMode) -> Self {
        Self { origin, mode }
    }

    /// Day-granularity timeline.
    pub fn daily(origin: NaiveDate) -> Self {
        Self::new(origin, ViewMode::Day)
    }

    /// Index of the first slot of `date`.
    pub fn index_of(&self, date: NaiveDate) -> i64 {
        (date - self.origin).num_days() * self.mode.slots_per_day()
    }

    /// Inclusive slot span covering whole days `[start, end]`.
    pub fn span_of(&self, start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let last = self.index_of(end) + self.mode.slots_per_day() - 1;
        (self.index_of(start), last)
    }

    /// Inclusive slot span for an hour-precise booking `[start, end)`.
    ///
    /// In day view this degrades to the days touched by the booking.
    /// Hours past `slots_per_day` clamp to the last slot of the day.
    pub fn span_of_datetimes(&self, start: NaiveDateTime, end: NaiveDateTime) -> (i64, i64) {
        match self.mode {
            ViewMode::Day => self.span_of(start.date(), end.date()),
            ViewMode::Hour { .. } => {
                let per_day = self.mode.slots_per_day();
                let slot = |t: NaiveDateTime| {
                    self.index_of(t.date()) + i64::from(t.hour()).min(per_day - 1)
                };
                let first = slot(start);
                // Exclusive end: a booking ending on the hour does not occupy that slot.
                let last = if end > start && end.minute() == 0 && end.second() == 0 {
                    slot(end - chrono::Duration::hours(1))
                } else {
                    slot(end)
                };
                (first.min(last), first.max(last))
            }
        }
    }

    /// Calendar date containing slot `index`.
    pub fn date_of(&self, index: i64) -> NaiveDate {
        let days = index.div_euclid(self.mode.slots_per_day());
        self.origin + chrono::Duration::days(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_day_view_span() {
        let tl = Timeline::daily(d(1));
        assert_eq!(tl.index_of(d(1)), 0);
        assert_eq!(tl.span_of(d(2), d(4)), (1, 3));
        // Reversed input is normalized
        assert_eq!(tl.span_of(d(4), d(2)), (1, 3));
    }

    #[test]
    fn test_hour_view_whole_days() {
        let tl = Timeline::new(d(1), ViewMode::Hour { slots_per_day: 8 });
        assert_eq!(tl.span_of(d(1), d(1)), (0, 7));
        assert_eq!(tl.span_of(d(2), d(3)), (8, 23));
    }

    #[test]
    fn test_hour_view_datetimes() {
        let tl = Timeline::new(d(1), ViewMode::Hour { slots_per_day: 24 });
        let start = d(2).and_hms_opt(8, 0, 0).unwrap();
        let end = d(2).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(tl.span_of_datetimes(start, end), (32, 35));

        let end_mid_hour = d(2).and_hms_opt(12, 30, 0).unwrap();
        assert_eq!(tl.span_of_datetimes(start, end_mid_hour), (32, 36));
    }

    #[test]
    fn test_day_view_datetimes() {
        let tl = Timeline::daily(d(1));
        let start = d(2).and_hms_opt(8, 0, 0).unwrap();
        let end = d(3).and_hms_opt(17, 0, 0).unwrap();
        assert_eq!(tl.span_of_datetimes(start, end), (1, 2));
    }

    #[test]
    fn test_date_of_negative_index() {
        let tl = Timeline::new(d(10), ViewMode::Hour { slots_per_day: 8 });
        assert_eq!(tl.date_of(-1), d(9));
        assert_eq!(tl.date_of(8), d(11));
    }
}
