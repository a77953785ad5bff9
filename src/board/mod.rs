//! Planning board and plan KPIs.
//!
//! The board is the caller layer the engine expects: it owns the schedule
//! registry, applies calendar policy, resolves learning curves by id, and
//! recomputes stack layouts after every change.
//!
//! # KPI
//!
//! `PlanKpi` summarizes the board: planned vs. unscheduled units,
//! resource-day load, utilization and stacking depth.

mod kpi;
mod planning;

pub use kpi::PlanKpi;
pub use planning::{Placement, PlanningBoard};
