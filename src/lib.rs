//! Production capacity scheduling for the U-Engine ecosystem.
//!
//! Turns orders dropped on a production-planning board into day-by-day
//! output plans. The engine is three pure, synchronous components plus the
//! thin caller layer that drives them.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `LearningCurveProfile`, `SchedulableResource`,
//!   `ProductionCalendar`, `ProductionOrder`, `AllocationResult`,
//!   `ScheduledTaskInterval`
//! - **`projection`**: Learning-curve projector (daily efficiency and output)
//! - **`allocation`**: Capacity allocator (quantity → resource-days + remainder)
//! - **`stacking`**: Overlap stack resolver (concurrent bookings → lanes)
//! - **`timeline`**: Day/hour discretization shared by the board and stacking
//! - **`board`**: Planning board (registry, calendar policy, restacking) and KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, invalid curves)
//! - **`config`**: TOML engine configuration
//! - **`error`**: Error types
//!
//! # Architecture
//!
//! Data flows one way: board → allocator (+ projector) → scheduled task →
//! registry → stack resolver. None of the engine components hold state;
//! the board owns the registry and recomputes stacking in full after every
//! change. Diagnostics go through `tracing`; the host installs a subscriber.
//!
//! # References
//!
//! - Wright (1936), "Factors Affecting the Cost of Airplanes"
//! - Golumbic (2004), "Algorithmic Graph Theory and Perfect Graphs"

pub mod allocation;
pub mod board;
pub mod config;
pub mod error;
pub mod models;
pub mod projection;
pub mod stacking;
pub mod timeline;
pub mod validation;
