//! Capacity allocation.
//!
//! Distributes an order quantity over consecutive resource-days under a
//! daily capacity ceiling, using the learning-curve projection when a
//! valid profile is available and a flat rate otherwise.
//!
//! # Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Quantity fits | segments, `remaining_quantity == 0` |
//! | Window too short | segments, `remaining_quantity > 0` |
//! | Zero capacity / fully blocked | no segments, full remainder |
//! | Negative quantity, deadline < start | `ValidationError` |

mod allocator;
mod request;

pub use allocator::CapacityAllocator;
pub use request::AllocationRequest;
