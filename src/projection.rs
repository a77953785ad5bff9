//! Learning-curve output projection.
//!
//! Turns a ramp-up profile into a per-day sequence of efficiency and
//! theoretical output over a date window.
//!
//! # Algorithm
//!
//! For day index `i` of the window:
//! 1. Progress = `i + 1` (elapsed days) or the theoretical output of days
//!    `0..i` (cumulative output), per the profile's threshold basis.
//! 2. Efficiency = the last point with `threshold <= progress`, clamped to
//!    the first/last point outside the curve's range.
//! 3. Output = `floor(working_minutes * operators * efficiency / 100 / smv)`.
//!
//! The sequence is finite (exactly N entries) and restartable: cloning the
//! iterator, or calling [`LearningCurveProjector::iter`] again, replays it.
//!
//! # Reference
//! Yelle (1979), "The Learning Curve: Historical Review and Comprehensive Survey"

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InvalidProfile;
use crate::models::{LearningCurveProfile, ThresholdBasis};

/// Projected capacity for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProjection {
    pub date: NaiveDate,
    /// Whole units the line can produce on `date`.
    pub theoretical_output_units: i64,
    /// Efficiency applied on `date` (percent).
    pub efficiency_percent: f64,
}

/// Projector over a validated profile and a fixed window.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_capacity::models::LearningCurveProfile;
/// use u_capacity::projection::LearningCurveProjector;
///
/// let profile = LearningCurveProfile::new("LC-TEE", 10.0)
///     .with_operators(25)
///     .with_point(1.0, 50.0)
///     .with_point(3.0, 80.0);
/// let start = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
///
/// let projector = LearningCurveProjector::new(&profile, start, 4).unwrap();
/// let output: Vec<i64> = projector.iter().map(|p| p.theoretical_output_units).collect();
/// assert_eq!(output, vec![600, 600, 960, 960]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LearningCurveProjector<'a> {
    profile: &'a LearningCurveProfile,
    start: NaiveDate,
    days: usize,
}

impl<'a> LearningCurveProjector<'a> {
    /// Validates the profile and fixes the window `[start, start + days - 1]`.
    pub fn new(
        profile: &'a LearningCurveProfile,
        start: NaiveDate,
        days: usize,
    ) -> Result<Self, InvalidProfile> {
        profile.validate()?;
        Ok(Self {
            profile,
            start,
            days,
        })
    }

    /// Window length in days.
    pub fn len(&self) -> usize {
        self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days == 0
    }

    /// A fresh pass over the window.
    pub fn iter(&self) -> Projections<'a> {
        Projections {
            profile: self.profile,
            start: self.start,
            days: self.days,
            index: 0,
            produced: 0,
        }
    }
}

impl<'a> IntoIterator for &LearningCurveProjector<'a> {
    type Item = DailyProjection;
    type IntoIter = Projections<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a projection window.
#[derive(Debug, Clone)]
pub struct Projections<'a> {
    profile: &'a LearningCurveProfile,
    start: NaiveDate,
    days: usize,
    index: usize,
    /// Theoretical output of the days already yielded.
    produced: i64,
}

impl Iterator for Projections<'_> {
    type Item = DailyProjection;

    fn next(&mut self) -> Option<DailyProjection> {
        if self.index >= self.days {
            return None;
        }

        let progress = match self.profile.threshold_basis {
            ThresholdBasis::ElapsedDays => (self.index + 1) as f64,
            ThresholdBasis::CumulativeOutput => self.produced as f64,
        };
        // Profile was validated non-empty in `LearningCurveProjector::new`
        let efficiency_percent = self
            .profile
            .point_at(progress)
            .map(|p| p.efficiency_percent)?;
        let theoretical_output_units = self.profile.output_at(efficiency_percent);

        let date = self.start + Duration::days(self.index as i64);
        self.index += 1;
        if self.profile.threshold_basis == ThresholdBasis::CumulativeOutput {
            self.produced = self.produced.saturating_add(theoretical_output_units);
        }

        Some(DailyProjection {
            date,
            theoretical_output_units,
            efficiency_percent,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.days - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Projections<'_> {}

/// Projects `days` days starting at `start`.
pub fn project(
    profile: &LearningCurveProfile,
    start: NaiveDate,
    days: usize,
) -> Result<Vec<DailyProjection>, InvalidProfile> {
    Ok(LearningCurveProjector::new(profile, start, days)?
        .iter()
        .collect())
}
