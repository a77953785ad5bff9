//! Allocation request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::validation::{ValidationError, ValidationErrorKind};

/// Input container for one allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Units to distribute.
    pub quantity_to_allocate: i64,
    /// First day of the window.
    pub start_date: NaiveDate,
    /// Last day of the window (inclusive).
    pub hard_deadline_date: NaiveDate,
    /// Resource-wide daily ceiling. `None` = unbounded.
    pub resource_daily_capacity_ceiling: Option<i64>,
    /// Per-day ceilings layered on top of the resource ceiling
    /// (blocked days, capacity already consumed by other bookings).
    #[serde(default)]
    pub day_ceilings: BTreeMap<NaiveDate, i64>,
    /// Flat rate used when no learning curve applies and no ceiling is set.
    #[serde(default)]
    pub default_daily_rate: Option<i64>,
}

impl AllocationRequest {
    /// Creates a request over `[start_date, hard_deadline_date]`.
    pub fn new(quantity: i64, start_date: NaiveDate, hard_deadline_date: NaiveDate) -> Self {
        Self {
            quantity_to_allocate: quantity,
            start_date,
            hard_deadline_date,
            resource_daily_capacity_ceiling: None,
            day_ceilings: BTreeMap::new(),
            default_daily_rate: None,
        }
    }

    /// Sets the resource-wide daily ceiling.
    pub fn with_ceiling(mut self, units: i64) -> Self {
        self.resource_daily_capacity_ceiling = Some(units);
        self
    }

    /// Caps a single day. Repeated calls keep the lowest cap.
    pub fn with_day_ceiling(mut self, date: NaiveDate, units: i64) -> Self {
        self.day_ceilings
            .entry(date)
            .and_modify(|cap| *cap = (*cap).min(units))
            .or_insert(units);
        self
    }

    /// Sets the caller's flat fallback rate.
    pub fn with_default_daily_rate(mut self, units: i64) -> Self {
        self.default_daily_rate = Some(units);
        self
    }

    /// Number of days in the window (at least 1).
    pub fn window_length(&self) -> usize {
        let days = (self.hard_deadline_date - self.start_date).num_days() + 1;
        days.max(1) as usize
    }

    /// Ceiling in force on `date`, floored at zero. `None` = unbounded.
    pub fn ceiling_on(&self, date: NaiveDate) -> Option<i64> {
        let day = self.day_ceilings.get(&date).copied();
        let cap = match (self.resource_daily_capacity_ceiling, day) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        cap.map(|c| c.max(0))
    }

    /// Rejects structurally malformed requests.
    ///
    /// Zero capacity, short windows and missing profiles are not errors.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity_to_allocate < 0 {
            return Err(ValidationError::new(
                ValidationErrorKind::NegativeQuantity,
                format!(
                    "quantity to allocate must not be negative, got {}",
                    self.quantity_to_allocate
                ),
            ));
        }
        if self.hard_deadline_date < self.start_date {
            return Err(ValidationError::new(
                ValidationErrorKind::DeadlineBeforeStart,
                format!(
                    "deadline {} precedes start {}",
                    self.hard_deadline_date, self.start_date
                ),
            ));
        }
        Ok(())
    }
}
