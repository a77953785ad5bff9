//! Learning-curve master data.
//!
//! A learning curve describes how a line ramps up on a newly loaded style:
//! efficiency starts low and climbs as operators gain experience. The curve
//! is a step function over a progress measure chosen by [`ThresholdBasis`].
//!
//! # Output Model
//! Theoretical daily output at efficiency `e` (percent):
//!
//! ```text
//! floor(working_minutes * operators * e / 100 / smv)
//! ```
//!
//! # Reference
//! Wright (1936), "Factors Affecting the Cost of Airplanes"

use serde::{Deserialize, Serialize};

use crate::error::InvalidProfile;

/// One step of a learning curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningCurvePoint {
    /// Progress at which this step takes effect (see [`ThresholdBasis`]).
    pub threshold: f64,
    /// Line efficiency from this threshold on (percent, > 0).
    pub efficiency_percent: f64,
}

impl LearningCurvePoint {
    pub fn new(threshold: f64, efficiency_percent: f64) -> Self {
        Self {
            threshold,
            efficiency_percent,
        }
    }
}

/// What a point's `threshold` measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdBasis {
    /// 1-based production day number within the window.
    #[default]
    ElapsedDays,
    /// Units produced on all previous days of the window.
    CumulativeOutput,
}

/// Ramp-up profile for a style.
///
/// Read-only master data: the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurveProfile {
    /// Profile identifier (master data key).
    pub id: String,
    /// Steps ordered by ascending threshold.
    pub points: Vec<LearningCurvePoint>,
    /// Standard minute value: minutes per unit at 100% efficiency.
    pub standard_minute_value: f64,
    /// Working minutes per operator per day.
    pub working_minutes_per_day_per_operator: f64,
    /// Operators on the line.
    pub operator_count: u32,
    /// Interpretation of `points[i].threshold`.
    #[serde(default)]
    pub threshold_basis: ThresholdBasis,
}

impl LearningCurveProfile {
    /// Creates a profile with no points, 480 working minutes and one operator.
    pub fn new(id: impl Into<String>, standard_minute_value: f64) -> Self {
        Self {
            id: id.into(),
            points: Vec::new(),
            standard_minute_value,
            working_minutes_per_day_per_operator: 480.0,
            operator_count: 1,
            threshold_basis: ThresholdBasis::default(),
        }
    }

    /// Appends a step.
    pub fn with_point(mut self, threshold: f64, efficiency_percent: f64) -> Self {
        self.points
            .push(LearningCurvePoint::new(threshold, efficiency_percent));
        self
    }

    pub fn with_working_minutes(mut self, minutes: f64) -> Self {
        self.working_minutes_per_day_per_operator = minutes;
        self
    }

    pub fn with_operators(mut self, operator_count: u32) -> Self {
        self.operator_count = operator_count;
        self
    }

    pub fn with_threshold_basis(mut self, basis: ThresholdBasis) -> Self {
        self.threshold_basis = basis;
        self
    }

    /// Checks the profile invariants.
    pub fn validate(&self) -> Result<(), InvalidProfile> {
        if self.points.is_empty() {
            return Err(InvalidProfile::EmptyPoints);
        }
        // NaN fails `> 0.0` as well
        if !(self.standard_minute_value > 0.0) || !self.standard_minute_value.is_finite() {
            return Err(InvalidProfile::NonPositiveSmv(self.standard_minute_value));
        }
        if !(self.working_minutes_per_day_per_operator > 0.0)
            || !self.working_minutes_per_day_per_operator.is_finite()
        {
            return Err(InvalidProfile::NonPositiveWorkingMinutes(
                self.working_minutes_per_day_per_operator,
            ));
        }
        if self.operator_count == 0 {
            return Err(InvalidProfile::NoOperators);
        }
        for (index, p) in self.points.iter().enumerate() {
            if !(p.efficiency_percent > 0.0) || !p.efficiency_percent.is_finite() {
                return Err(InvalidProfile::InvalidEfficiency {
                    index,
                    efficiency: p.efficiency_percent,
                });
            }
            if !p.threshold.is_finite() {
                return Err(InvalidProfile::NonFiniteThreshold {
                    index,
                    threshold: p.threshold,
                });
            }
        }
        for (index, pair) in self.points.windows(2).enumerate() {
            if pair[1].threshold < pair[0].threshold {
                return Err(InvalidProfile::UnorderedThreshold {
                    index: index + 1,
                    threshold: pair[1].threshold,
                });
            }
        }
        Ok(())
    }

    /// Theoretical whole units per day at `efficiency_percent`.
    pub fn output_at(&self, efficiency_percent: f64) -> i64 {
        let minutes = self.working_minutes_per_day_per_operator * f64::from(self.operator_count);
        (minutes * efficiency_percent / 100.0 / self.standard_minute_value).floor() as i64
    }

    /// Step lookup: the last point whose threshold is at or below `progress`.
    ///
    /// Clamps to the first point when `progress` precedes every threshold.
    /// Returns `None` only for an empty profile.
    pub fn point_at(&self, progress: f64) -> Option<&LearningCurvePoint> {
        let reached = self.points.partition_point(|p| p.threshold <= progress);
        self.points.get(reached.saturating_sub(1))
    }

    /// Highest efficiency on the curve.
    pub fn peak_efficiency(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.efficiency_percent)
            .fold(0.0, f64::max)
    }
}
