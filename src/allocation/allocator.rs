//! Daily capacity allocator.
//!
//! # Algorithm
//!
//! 1. Window = `max(1, days(start, deadline) + 1)`.
//! 2. Daily capacity comes from the learning-curve projection, or from a
//!    flat rate at 100% efficiency when no valid profile is available.
//! 3. Days are scanned in order. Each day takes
//!    `min(capacity, ceiling, quantity still open)`. Days with nothing to
//!    take are skipped without ending the scan.
//! 4. The scan stops once the quantity is covered or the window ends;
//!    whatever is left is the remainder.
//!
//! # Complexity
//! O(N) in the window length.

use chrono::Duration;
use tracing::{debug, warn};

use super::AllocationRequest;
use crate::models::{AllocationResult, AllocationSegment, LearningCurveProfile};
use crate::projection::LearningCurveProjector;
use crate::validation::ValidationError;

const FLAT_EFFICIENCY_PERCENT: f64 = 100.0;

/// Distributes an order quantity across resource-days.
///
/// Stateless: identical inputs always produce identical results.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_capacity::allocation::{AllocationRequest, CapacityAllocator};
///
/// let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
/// let deadline = NaiveDate::from_ymd_opt(2024, 7, 5).unwrap();
/// let request = AllocationRequest::new(1000, start, deadline).with_ceiling(250);
///
/// let result = CapacityAllocator::new().allocate(&request, None, "Tee").unwrap();
/// assert_eq!(result.segments.len(), 4);
/// assert_eq!(result.remaining_quantity, 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityAllocator;

impl CapacityAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Allocates `request.quantity_to_allocate` over the request window.
    ///
    /// An absent or invalid `profile` falls back to a flat daily rate.
    /// `style` is only used for diagnostics.
    ///
    /// # Errors
    /// Negative quantity or a deadline before the start date.
    pub fn allocate(
        &self,
        request: &AllocationRequest,
        profile: Option<&LearningCurveProfile>,
        style: &str,
    ) -> Result<AllocationResult, ValidationError> {
        request.validate()?;

        let window = request.window_length();
        let projector =
            profile.map(|p| LearningCurveProjector::new(p, request.start_date, window));
        let capacities = match projector {
            Some(Ok(projector)) => Some(
                projector
                    .iter()
                    .map(|p| (p.theoretical_output_units, p.efficiency_percent))
                    .collect::<Vec<_>>(),
            ),
            Some(Err(e)) => {
                warn!(
                    style,
                    profile_id = profile.map(|p| p.id.as_str()).unwrap_or_default(),
                    error = %e,
                    "allocator: invalid learning curve, using flat rate"
                );
                None
            }
            None => None,
        };
        let used_fallback = capacities.is_none();
        let capacities = capacities.unwrap_or_else(|| {
            vec![(flat_daily_rate(request, window), FLAT_EFFICIENCY_PERCENT); window]
        });

        let quantity = request.quantity_to_allocate;
        let mut cumulative = 0i64;
        let mut segments = Vec::new();

        for (offset, &(projected, efficiency_percent)) in capacities.iter().enumerate() {
            if cumulative >= quantity {
                break;
            }
            let date = request.start_date + Duration::days(offset as i64);
            let day_capacity = match request.ceiling_on(date) {
                Some(ceiling) => projected.min(ceiling),
                None => projected,
            };
            let qty = day_capacity.min(quantity - cumulative);
            if qty <= 0 {
                continue;
            }
            cumulative += qty;
            segments.push(AllocationSegment {
                date,
                planned_qty: qty,
                efficiency_percent,
                cumulative_qty: cumulative,
            });
        }

        let remaining_quantity = (quantity - cumulative).max(0);
        let actual_end_date = segments
            .last()
            .map(|s| s.date)
            .unwrap_or(request.start_date);

        debug!(
            style,
            quantity,
            window,
            planned = cumulative,
            remaining = remaining_quantity,
            used_fallback,
            "allocator: allocation complete"
        );

        Ok(AllocationResult {
            segments,
            remaining_quantity,
            actual_end_date,
            used_fallback,
        })
    }
}

/// Flat daily rate when no learning curve applies.
///
/// The resource ceiling wins when present, then the caller's default rate,
/// then an even spread of the quantity over the window. Never exceeds the
/// quantity itself.
///
/// With a ceiling the fill is front-loaded (full ceiling from the first
/// day), not spread evenly across the window.
fn flat_daily_rate(request: &AllocationRequest, window: usize) -> i64 {
    let quantity = request.quantity_to_allocate;
    let window = window.max(1) as i64;
    let base = request
        .resource_daily_capacity_ceiling
        .or(request.default_daily_rate)
        .unwrap_or_else(|| {
            // Half-up rounding without forming `quantity + window / 2`
            let round_up = quantity % window >= window - window / 2;
            (quantity / window + i64::from(round_up)).max(1)
        });
    base.max(0).min(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThresholdBasis;
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveDate;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn quantities(result: &AllocationResult) -> Vec<i64> {
        result.segments.iter().map(|s| s.planned_qty).collect()
    }

    fn ramp() -> LearningCurveProfile {
        // 1200 units/day at 100%
        LearningCurveProfile::new("LC-POLO", 8.0)
            .with_operators(20)
            .with_point(1.0, 25.0)
            .with_point(2.0, 50.0)
            .with_point(3.0, 100.0)
    }

    #[test]
    fn test_flat_fallback_with_ceiling() {
        let request = AllocationRequest::new(1000, d(1), d(5)).with_ceiling(250);
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();

        assert_eq!(quantities(&result), vec![250, 250, 250, 250]);
        assert_eq!(result.remaining_quantity, 0);
        assert_eq!(result.actual_end_date, d(4));
        assert!(result.used_fallback);
        assert!(result.segments.iter().all(|s| s.efficiency_percent == 100.0));
    }

    #[test]
    fn test_zero_capacity_window() {
        let request = AllocationRequest::new(100, d(1), d(5)).with_ceiling(0);
        let result = CapacityAllocator::new()
            .allocate(&request, Some(&ramp()), "Tee")
            .unwrap();

        assert!(result.segments.is_empty());
        assert_eq!(result.remaining_quantity, 100);
        assert_eq!(result.actual_end_date, d(1));
    }

    #[test]
    fn test_flat_even_spread_without_ceiling() {
        // round(1000 / 3) = 333 → 333, 333, 333, remainder 1
        let request = AllocationRequest::new(1000, d(1), d(3));
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();
        assert_eq!(quantities(&result), vec![333, 333, 333]);
        assert_eq!(result.remaining_quantity, 1);

        // round(10 / 4) = 2.5 → 3
        let request = AllocationRequest::new(10, d(1), d(4));
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();
        assert_eq!(quantities(&result), vec![3, 3, 3, 1]);
    }

    #[test]
    fn test_flat_minimum_one_unit() {
        // round(2 / 10) = 0 → at least 1 per day
        let request = AllocationRequest::new(2, d(1), d(10));
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();
        assert_eq!(quantities(&result), vec![1, 1]);
        assert_eq!(result.actual_end_date, d(2));
    }

    #[test]
    fn test_flat_spread_near_i64_max() {
        let request = AllocationRequest::new(i64::MAX, d(1), d(3));
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();

        // i64::MAX = 3 * 3074457345618258602 + 1, rounds down
        assert_eq!(quantities(&result), vec![3_074_457_345_618_258_602; 3]);
        assert_eq!(result.remaining_quantity, 1);

        let request = AllocationRequest::new(i64::MAX, d(1), d(2));
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();
        // 4611686018427387903.5 rounds up; the second day takes the rest
        assert_eq!(
            quantities(&result),
            vec![4_611_686_018_427_387_904, 4_611_686_018_427_387_903]
        );
        assert_eq!(result.remaining_quantity, 0);
    }

    #[test]
    fn test_tiny_smv_does_not_overflow() {
        let profile = LearningCurveProfile::new("TINY", 1e-300).with_point(1.0, 100.0);
        let request = AllocationRequest::new(5000, d(1), d(3));
        let result = CapacityAllocator::new()
            .allocate(&request, Some(&profile), "Tee")
            .unwrap();
        assert_eq!(quantities(&result), vec![5000]);
        assert!(!result.used_fallback);
    }

    #[test]
    fn test_default_daily_rate() {
        let request = AllocationRequest::new(1000, d(1), d(10)).with_default_daily_rate(400);
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();
        assert_eq!(quantities(&result), vec![400, 400, 200]);
    }

    #[test]
    fn test_learning_curve_allocation() {
        let request = AllocationRequest::new(3000, d(1), d(10));
        let result = CapacityAllocator::new()
            .allocate(&request, Some(&ramp()), "Polo")
            .unwrap();

        // 300, 600, 1200, then the remaining 900
        assert_eq!(quantities(&result), vec![300, 600, 1200, 900]);
        let eff: Vec<f64> = result.segments.iter().map(|s| s.efficiency_percent).collect();
        assert_eq!(eff, vec![25.0, 50.0, 100.0, 100.0]);
        assert!(!result.used_fallback);
        assert_eq!(result.actual_end_date, d(4));
    }

    #[test]
    fn test_learning_curve_clamped_by_ceiling() {
        let request = AllocationRequest::new(3000, d(1), d(4)).with_ceiling(800);
        let result = CapacityAllocator::new()
            .allocate(&request, Some(&ramp()), "Polo")
            .unwrap();
        assert_eq!(quantities(&result), vec![300, 600, 800, 800]);
        assert_eq!(result.remaining_quantity, 500);
    }

    #[test]
    fn test_blocked_days_are_skipped_not_terminal() {
        let request = AllocationRequest::new(1000, d(1), d(6))
            .with_ceiling(300)
            .with_day_ceiling(d(2), 0)
            .with_day_ceiling(d(3), 0);
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();

        let dates: Vec<NaiveDate> = result.segments.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![d(1), d(4), d(5), d(6)]);
        assert_eq!(quantities(&result), vec![300, 300, 300, 100]);
    }

    #[test]
    fn test_invalid_profile_falls_back() {
        let broken = LearningCurveProfile::new("BROKEN", 0.0).with_point(1.0, 80.0);
        let request = AllocationRequest::new(500, d(1), d(5)).with_ceiling(200);
        let result = CapacityAllocator::new()
            .allocate(&request, Some(&broken), "Tee")
            .unwrap();

        assert!(result.used_fallback);
        assert_eq!(quantities(&result), vec![200, 200, 100]);
    }

    #[test]
    fn test_single_day_window() {
        let request = AllocationRequest::new(500, d(3), d(3)).with_ceiling(200);
        let result = CapacityAllocator::new()
            .allocate(&request, None, "Tee")
            .unwrap();
        assert_eq!(quantities(&result), vec![200]);
        assert_eq!(result.remaining_quantity, 300);
    }

    #[test]
    fn test_zero_quantity() {
        let request = AllocationRequest::new(0, d(1), d(5));
        let result = CapacityAllocator::new()
            .allocate(&request, Some(&ramp()), "Tee")
            .unwrap();
        assert!(result.segments.is_empty());
        assert_eq!(result.remaining_quantity, 0);
        assert_eq!(result.actual_end_date, d(1));
    }

    #[test]
    fn test_malformed_requests_rejected() {
        let allocator = CapacityAllocator::new();

        let err = allocator
            .allocate(&AllocationRequest::new(-5, d(1), d(3)), None, "Tee")
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::NegativeQuantity);

        let err = allocator
            .allocate(&AllocationRequest::new(5, d(3), d(1)), None, "Tee")
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::DeadlineBeforeStart);
    }

    #[test]
    fn test_deterministic() {
        let request = AllocationRequest::new(4321, d(1), d(9))
            .with_ceiling(700)
            .with_day_ceiling(d(5), 100);
        let allocator = CapacityAllocator::new();
        let a = allocator.allocate(&request, Some(&ramp()), "Polo").unwrap();
        let b = allocator.allocate(&request, Some(&ramp()), "Polo").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invariants_randomized() {
        let mut rng = SmallRng::seed_from_u64(7);
        let allocator = CapacityAllocator::new();

        for _ in 0..300 {
            let start = d(1);
            let deadline = start + Duration::days(rng.random_range(0..40));
            let quantity = rng.random_range(0..20_000);

            let mut request = AllocationRequest::new(quantity, start, deadline);
            if rng.random_bool(0.7) {
                request = request.with_ceiling(rng.random_range(0..1500));
            }
            if rng.random_bool(0.3) {
                request = request.with_default_daily_rate(rng.random_range(1..900));
            }
            for _ in 0..rng.random_range(0..5) {
                let day = start + Duration::days(rng.random_range(0..40));
                request = request.with_day_ceiling(day, rng.random_range(0..400));
            }

            let profile = if rng.random_bool(0.6) {
                let basis = if rng.random_bool(0.5) {
                    ThresholdBasis::ElapsedDays
                } else {
                    ThresholdBasis::CumulativeOutput
                };
                Some(
                    LearningCurveProfile::new("R", rng.random_range(0.5..20.0))
                        .with_operators(rng.random_range(1..40))
                        .with_threshold_basis(basis)
                        .with_point(1.0, rng.random_range(10.0..60.0))
                        .with_point(4.0, rng.random_range(40.0..110.0)),
                )
            } else {
                None
            };

            let result = allocator
                .allocate(&request, profile.as_ref(), "R")
                .unwrap();

            // Conservation
            let planned: i64 = result.segments.iter().map(|s| s.planned_qty).sum();
            assert_eq!(planned + result.remaining_quantity, quantity);
            assert!(result.remaining_quantity >= 0);

            // Monotonicity
            let mut last = 0;
            for s in &result.segments {
                assert!(s.planned_qty > 0);
                assert!(s.cumulative_qty >= last);
                last = s.cumulative_qty;
            }
            assert_eq!(last, quantity - result.remaining_quantity);

            // Capacity respect: never above the day's projected (or flat)
            // output, nor above its ceiling
            let window = request.window_length();
            let capacities: Vec<i64> = match &profile {
                Some(p) => crate::projection::project(p, start, window)
                    .unwrap()
                    .iter()
                    .map(|day| day.theoretical_output_units)
                    .collect(),
                None => vec![flat_daily_rate(&request, window); window],
            };
            for s in &result.segments {
                let offset = (s.date - start).num_days() as usize;
                let mut cap = capacities[offset];
                if let Some(ceiling) = request.ceiling_on(s.date) {
                    cap = cap.min(ceiling);
                }
                assert!(s.planned_qty <= cap);
                assert!(s.date >= start && s.date <= deadline);
            }

            // End date
            match result.segments.last() {
                Some(s) => assert_eq!(result.actual_end_date, s.date),
                None => assert_eq!(result.actual_end_date, start),
            }
        }
    }
}
