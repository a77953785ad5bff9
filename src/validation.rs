//! Input validation for capacity planning.
//!
//! Checks structural integrity of master data and orders before they reach
//! the board. Detects:
//! - Duplicate IDs
//! - Negative capacities and quantities
//! - Learning curves the projector cannot evaluate
//!
//! Ordinary data variance (zero capacity, missing curves, short windows)
//! is deliberately not reported: the allocator handles it.

use std::collections::HashSet;
use thiserror::Error;

use crate::models::{LearningCurveProfile, ProductionOrder, SchedulableResource};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A quantity to allocate is below zero.
    NegativeQuantity,
    /// A window ends before it starts.
    DeadlineBeforeStart,
    /// A resource declares a negative daily capacity.
    NegativeCapacity,
    /// A learning curve fails its invariants.
    InvalidProfile,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates board master data.
///
/// Checks:
/// 1. No duplicate resource IDs
/// 2. No negative resource capacities
/// 3. No duplicate learning-curve IDs
/// 4. Every learning curve passes its invariants
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_master_data(
    resources: &[SchedulableResource],
    profiles: &[LearningCurveProfile],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut resource_ids = HashSet::new();
    for r in resources {
        if !resource_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate resource ID: {}", r.id),
            ));
        }
        if let Some(cap) = r.daily_capacity.filter(|c| *c < 0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeCapacity,
                format!("Resource '{}' has negative daily capacity {cap}", r.id),
            ));
        }
    }

    let mut profile_ids = HashSet::new();
    for p in profiles {
        if !profile_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate learning curve ID: {}", p.id),
            ));
        }
        if let Err(e) = p.validate() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidProfile,
                format!("Learning curve '{}': {e}", p.id),
            ));
        }
    }

    finish(errors)
}

/// Validates orders before placement.
///
/// Checks for duplicate order IDs and negative quantities.
pub fn validate_orders(orders: &[ProductionOrder]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut order_ids = HashSet::new();

    for o in orders {
        if !order_ids.insert(o.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate order ID: {}", o.id),
            ));
        }
        if o.quantity < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeQuantity,
                format!("Order '{}' has negative quantity {}", o.id, o.quantity),
            ));
        }
    }

    finish(errors)
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_resources() -> Vec<SchedulableResource> {
        vec![
            SchedulableResource::new("L1").with_daily_capacity(800),
            SchedulableResource::new("L2").with_daily_capacity(600),
            SchedulableResource::new("L3"),
        ]
    }

    fn sample_profiles() -> Vec<LearningCurveProfile> {
        vec![
            LearningCurveProfile::new("LC-TEE", 9.5)
                .with_operators(28)
                .with_point(1.0, 45.0)
                .with_point(3.0, 70.0),
            LearningCurveProfile::new("LC-POLO", 14.0)
                .with_operators(32)
                .with_point(1.0, 35.0),
        ]
    }

    fn ship() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
    }

    #[test]
    fn test_valid_master_data() {
        assert!(validate_master_data(&sample_resources(), &sample_profiles()).is_ok());
    }

    #[test]
    fn test_duplicate_resource_id() {
        let resources = vec![
            SchedulableResource::new("L1"),
            SchedulableResource::new("L1"),
        ];
        let errors = validate_master_data(&resources, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("resource")));
    }

    #[test]
    fn test_negative_capacity() {
        let resources = vec![SchedulableResource::new("L1").with_daily_capacity(-10)];
        let errors = validate_master_data(&resources, &[]).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::NegativeCapacity);
    }

    #[test]
    fn test_invalid_profile_reported() {
        let mut profiles = sample_profiles();
        profiles.push(LearningCurveProfile::new("LC-EMPTY", 10.0));

        let errors = validate_master_data(&sample_resources(), &profiles).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidProfile);
        assert!(errors[0].message.contains("LC-EMPTY"));
    }

    #[test]
    fn test_duplicate_profile_id() {
        let mut profiles = sample_profiles();
        profiles.push(profiles[0].clone());
        let errors = validate_master_data(&[], &profiles).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_orders() {
        let orders = vec![
            ProductionOrder::new("PO1", 1000, ship()),
            ProductionOrder::new("PO2", 0, ship()),
        ];
        assert!(validate_orders(&orders).is_ok());

        let bad = vec![
            ProductionOrder::new("PO1", 1000, ship()),
            ProductionOrder::new("PO1", -3, ship()),
        ];
        let errors = validate_orders(&bad).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new(ValidationErrorKind::NegativeQuantity, "qty -1");
        assert_eq!(err.to_string(), "qty -1");
    }
}
