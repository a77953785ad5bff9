//! Allocation output and scheduled task model.
//!
//! An allocation distributes an order's quantity over consecutive
//! resource-days. Only days that actually receive quantity become
//! segments; whatever does not fit stays as a remainder.
//!
//! # Invariants
//! - `Σ segment.planned_qty + remaining_quantity == requested quantity`
//! - `cumulative_qty` is non-decreasing and ends at the planned total.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Quantity planned on one resource-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSegment {
    pub date: NaiveDate,
    /// Units planned on `date` (> 0 for emitted segments).
    pub planned_qty: i64,
    /// Efficiency the line runs at on `date` (percent).
    pub efficiency_percent: f64,
    /// Units planned up to and including `date`.
    pub cumulative_qty: i64,
}

/// Outcome of one allocation.
///
/// A non-zero `remaining_quantity` is a partial success, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Filled days in date order.
    pub segments: Vec<AllocationSegment>,
    /// Units that did not fit in the window.
    pub remaining_quantity: i64,
    /// Date of the last segment, or the start date if none was emitted.
    pub actual_end_date: NaiveDate,
    /// Whether the flat-rate fallback replaced the learning curve.
    pub used_fallback: bool,
}

impl AllocationResult {
    /// Total units planned.
    pub fn planned_quantity(&self) -> i64 {
        self.segments.last().map(|s| s.cumulative_qty).unwrap_or(0)
    }

    /// Whether the whole quantity fit.
    pub fn is_complete(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Whether nothing could be scheduled.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First planned date.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.segments.first().map(|s| s.date)
    }
}

/// A booked task: an order's allocation on one resource.
///
/// Owned by the caller's registry; the engine only produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTaskInterval {
    /// Unique task identifier.
    pub task_id: String,
    /// Order this task produces.
    pub order_id: String,
    /// Style label (for display).
    pub style: String,
    /// Resource the task is booked on.
    pub resource_id: String,
    /// First planned date.
    pub start_date: NaiveDate,
    /// Last planned date (inclusive).
    pub end_date: NaiveDate,
    /// Planned days.
    pub segments: Vec<AllocationSegment>,
    /// Units requested for this task.
    pub quantity: i64,
    /// Units that did not fit.
    pub remaining_quantity: i64,
}

impl ScheduledTaskInterval {
    /// Builds a task from a non-empty allocation.
    ///
    /// Returns `None` when the allocation has no segments.
    pub fn from_allocation(
        task_id: impl Into<String>,
        order_id: impl Into<String>,
        resource_id: impl Into<String>,
        quantity: i64,
        result: AllocationResult,
    ) -> Option<Self> {
        let start_date = result.start_date()?;
        Some(Self {
            task_id: task_id.into(),
            order_id: order_id.into(),
            style: String::new(),
            resource_id: resource_id.into(),
            start_date,
            end_date: result.actual_end_date,
            segments: result.segments,
            quantity,
            remaining_quantity: result.remaining_quantity,
        })
    }

    /// Sets the style label.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Units planned across all segments.
    pub fn planned_quantity(&self) -> i64 {
        self.segments.iter().map(|s| s.planned_qty).sum()
    }

    /// Units planned on `date`.
    pub fn planned_on(&self, date: NaiveDate) -> i64 {
        self.segments
            .iter()
            .filter(|s| s.date == date)
            .map(|s| s.planned_qty)
            .sum()
    }

    /// Whether this task's date span intersects `other`'s.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// Duration in calendar days (inclusive).
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Replaces the segments, rebuilding cumulative totals and the date span.
    ///
    /// Segments are sorted by date; same-day segments are summed.
    /// Empty input leaves the span unchanged.
    pub fn set_segments(&mut self, mut segments: Vec<AllocationSegment>) {
        segments.sort_by_key(|s| s.date);

        let mut merged: Vec<AllocationSegment> = Vec::with_capacity(segments.len());
        for seg in segments {
            match merged.last_mut() {
                Some(last) if last.date == seg.date => {
                    // Keep the efficiency of the larger contribution
                    if seg.planned_qty > last.planned_qty {
                        last.efficiency_percent = seg.efficiency_percent;
                    }
                    last.planned_qty += seg.planned_qty;
                }
                _ => merged.push(seg),
            }
        }

        let mut cumulative = 0;
        for seg in &mut merged {
            cumulative += seg.planned_qty;
            seg.cumulative_qty = cumulative;
        }

        if let (Some(first), Some(last)) = (merged.first(), merged.last()) {
            self.start_date = first.date;
            self.end_date = last.date;
        }
        self.segments = merged;
    }
}
