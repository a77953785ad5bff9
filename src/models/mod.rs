//! Capacity planning domain models.
//!
//! Master data (learning curves, resources, calendars), planning input
//! (orders) and planning output (allocations, scheduled tasks).
//!
//! # Domain Mappings
//!
//! | u-capacity | Garment factory | Generic |
//! |------------|-----------------|---------|
//! | ProductionOrder | Buyer PO for a style | Job |
//! | SchedulableResource | Sewing line | Machine |
//! | LearningCurveProfile | Style ramp-up curve | Rate profile |
//! | ScheduledTaskInterval | Booking on the board | Assignment |

mod calendar;
mod learning_curve;
mod order;
mod resource;
mod schedule;

pub use calendar::{BlockedDates, ProductionCalendar};
pub use learning_curve::{LearningCurvePoint, LearningCurveProfile, ThresholdBasis};
pub use order::ProductionOrder;
pub use resource::SchedulableResource;
pub use schedule::{AllocationResult, AllocationSegment, ScheduledTaskInterval};
