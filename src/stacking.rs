//! Overlap stacking for concurrent bookings.
//!
//! Assigns each task on a resource a vertical lane ("stack level") such
//! that tasks sharing any time slot never share a lane.
//!
//! # Algorithm
//!
//! Greedy interval-graph colouring:
//! 1. Order tasks by start index, ties by input order (stable sort).
//! 2. Keep a bitmask of occupied levels per time slot.
//! 3. Give each task the lowest level free across its whole span, then
//!    mark that level occupied over the span.
//!
//! Every already-placed task that conflicts with a new task covers the new
//! task's start slot, so the highest level used is exactly the peak
//! concurrency minus one: optimal for interval graphs.
//!
//! The search is capped. A task that finds every lane below the cap taken
//! is put on the last lane and reported as overflowed; only rendering
//! degrades. Results are order-sensitive, so callers must re-run the
//! resolver over the full task set of a resource after every change.
//!
//! # Reference
//! Golumbic (2004), "Algorithmic Graph Theory and Perfect Graphs", Ch. 8

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::models::ScheduledTaskInterval;
use crate::timeline::Timeline;

/// Hard upper bound on the lane cap (width of the occupancy mask).
pub const MAX_STACK_LEVELS: usize = 64;

/// Default lane cap.
pub const DEFAULT_STACK_LEVEL_CAP: usize = 12;

/// A task's span on the discretized timeline (inclusive bounds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackItem {
    pub task_id: String,
    pub start_index: i64,
    pub end_index: i64,
}

impl StackItem {
    /// Creates an item; reversed bounds are swapped.
    pub fn new(task_id: impl Into<String>, start_index: i64, end_index: i64) -> Self {
        Self {
            task_id: task_id.into(),
            start_index: start_index.min(end_index),
            end_index: start_index.max(end_index),
        }
    }

    /// Places a scheduled task on `timeline`.
    pub fn from_task(task: &ScheduledTaskInterval, timeline: &Timeline) -> Self {
        let (start, end) = timeline.span_of(task.start_date, task.end_date);
        Self::new(task.task_id.clone(), start, end)
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_index <= other.end_index && other.start_index <= self.end_index
    }
}

/// Lane assigned to one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackAssignment {
    pub task_id: String,
    pub level: usize,
}

/// Lanes for every task of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackLayout {
    /// One entry per input task, in input order.
    pub assignments: Vec<StackAssignment>,
    /// Tasks that found no free lane below the cap.
    pub overflowed: Vec<String>,
}

impl StackLayout {
    /// Level of `task_id`, if it was part of the input.
    pub fn level_of(&self, task_id: &str) -> Option<usize> {
        self.assignments
            .iter()
            .find(|a| a.task_id == task_id)
            .map(|a| a.level)
    }

    /// Highest level in use (`None` for an empty layout).
    pub fn max_level(&self) -> Option<usize> {
        self.assignments.iter().map(|a| a.level).max()
    }

    /// Lanes needed to render the layout.
    pub fn lane_count(&self) -> usize {
        self.max_level().map_or(0, |l| l + 1)
    }

    pub fn has_overflow(&self) -> bool {
        !self.overflowed.is_empty()
    }

    /// `task_id → level` lookup table.
    pub fn to_map(&self) -> HashMap<String, usize> {
        self.assignments
            .iter()
            .map(|a| (a.task_id.clone(), a.level))
            .collect()
    }
}

/// Greedy lane assignment with a soft cap.
#[derive(Debug, Clone, Copy)]
pub struct OverlapStackResolver {
    level_cap: usize,
}

impl OverlapStackResolver {
    /// Creates a resolver searching at most `level_cap` lanes
    /// (clamped to `1..=MAX_STACK_LEVELS`).
    pub fn new(level_cap: usize) -> Self {
        Self {
            level_cap: level_cap.clamp(1, MAX_STACK_LEVELS),
        }
    }

    pub fn level_cap(&self) -> usize {
        self.level_cap
    }

    /// Assigns lanes to all `items` of one resource.
    pub fn resolve(&self, items: &[StackItem]) -> StackLayout {
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by_key(|&i| items[i].start_index);

        let cap_mask: u64 = if self.level_cap >= 64 {
            u64::MAX
        } else {
            (1u64 << self.level_cap) - 1
        };

        let mut occupied: HashMap<i64, u64> = HashMap::new();
        let mut levels = vec![0usize; items.len()];
        let mut overflowed = Vec::new();

        for &idx in &order {
            let item = &items[idx];
            let span = item.start_index..=item.end_index;

            let taken = span
                .clone()
                .filter_map(|slot| occupied.get(&slot))
                .fold(0u64, |acc, &mask| acc | mask);
            let free = !taken & cap_mask;

            let level = if free == 0 {
                overflowed.push(item.task_id.clone());
                self.level_cap - 1
            } else {
                free.trailing_zeros() as usize
            };

            let bit = 1u64 << level;
            for slot in span {
                *occupied.entry(slot).or_insert(0) |= bit;
            }
            levels[idx] = level;
        }

        if !overflowed.is_empty() {
            warn!(
                cap = self.level_cap,
                overflowed = overflowed.len(),
                "stacking: lane cap exceeded, bookings will render on the last lane"
            );
        }

        StackLayout {
            assignments: items
                .iter()
                .zip(levels)
                .map(|(item, level)| StackAssignment {
                    task_id: item.task_id.clone(),
                    level,
                })
                .collect(),
            overflowed,
        }
    }

    /// Lays out scheduled tasks of one resource on `timeline`.
    pub fn resolve_tasks(
        &self,
        tasks: &[ScheduledTaskInterval],
        timeline: &Timeline,
    ) -> StackLayout {
        let items: Vec<StackItem> = tasks
            .iter()
            .map(|t| StackItem::from_task(t, timeline))
            .collect();
        self.resolve(&items)
    }
}

impl Default for OverlapStackResolver {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_LEVEL_CAP)
    }
}

/// Peak number of items sharing one slot.
pub fn peak_concurrency(items: &[StackItem]) -> usize {
    // Widened so an end at `i64::MAX` still closes one slot later
    let mut events: Vec<(i128, i32)> = Vec::with_capacity(items.len() * 2);
    for item in items {
        events.push((i128::from(item.start_index), 1));
        events.push((i128::from(item.end_index) + 1, -1));
    }
    // Ends (-1) sort before starts (+1) at the same slot
    events.sort();

    let mut current = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        current += delta;
        peak = peak.max(current);
    }
    peak as usize
}
