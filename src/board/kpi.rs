//! Plan quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Planned | Units placed on any resource-day |
//! | Total Unscheduled | Units left over by partial allocations |
//! | Load | Units per resource-day bucket |
//! | Utilization | planned / (daily capacity × loaded days) |
//! | Peak Stack Level | Highest lane used on any resource |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::PlanningBoard;
use crate::models::BlockedDates;

/// Plan performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanKpi {
    /// Booked tasks.
    pub task_count: usize,
    /// Units planned across all tasks.
    pub total_planned: i64,
    /// Units that did not fit.
    pub total_unscheduled: i64,
    /// Units per resource per day.
    pub load_by_resource_day: BTreeMap<String, BTreeMap<NaiveDate, i64>>,
    /// Per-resource bucket utilization (capacity-bound resources only).
    pub utilization_by_resource: HashMap<String, f64>,
    /// Highest stack level in use; `None` for an empty board.
    pub peak_stack_level: Option<usize>,
}

impl PlanKpi {
    /// Computes KPIs for the current board state.
    pub fn calculate<C: BlockedDates>(board: &PlanningBoard<C>) -> Self {
        let mut task_count = 0;
        let mut total_planned = 0;
        let mut total_unscheduled = 0;
        let mut load_by_resource_day: BTreeMap<String, BTreeMap<NaiveDate, i64>> = BTreeMap::new();

        for task in board.tasks() {
            task_count += 1;
            total_planned += task.planned_quantity();
            total_unscheduled += task.remaining_quantity;

            let load = load_by_resource_day
                .entry(task.resource_id.clone())
                .or_default();
            for seg in &task.segments {
                *load.entry(seg.date).or_insert(0) += seg.planned_qty;
            }
        }

        let mut utilization_by_resource = HashMap::new();
        for resource in board.resources() {
            let (Some(cap), Some(load)) =
                (resource.daily_capacity, load_by_resource_day.get(&resource.id))
            else {
                continue;
            };
            if cap <= 0 || load.is_empty() {
                continue;
            }
            let planned: i64 = load.values().sum();
            let available = cap * load.len() as i64;
            utilization_by_resource.insert(resource.id.clone(), planned as f64 / available as f64);
        }

        let peak_stack_level = board
            .stack_layouts()
            .values()
            .filter_map(|layout| layout.max_level())
            .max();

        Self {
            task_count,
            total_planned,
            total_unscheduled,
            load_by_resource_day,
            utilization_by_resource,
            peak_stack_level,
        }
    }

    /// Units booked on `resource_id` for `date`.
    pub fn load_on(&self, resource_id: &str, date: NaiveDate) -> i64 {
        self.load_by_resource_day
            .get(resource_id)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(0)
    }
}
