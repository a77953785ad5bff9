//! Resource model.
//!
//! A schedulable resource is a production line (or cell) with a daily
//! output ceiling. The ceiling caps every resource-day bucket regardless
//! of what the learning curve projects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A production line that orders are allocated onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulableResource {
    /// Unique resource identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Maximum units per day. `None` = unconstrained.
    pub daily_capacity: Option<i64>,
    /// Domain-specific metadata (floor, line type, ...).
    pub attributes: HashMap<String, String>,
}

impl SchedulableResource {
    /// Creates an unconstrained resource.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            daily_capacity: None,
            attributes: HashMap::new(),
        }
    }

    /// Sets the resource name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the daily capacity ceiling.
    pub fn with_daily_capacity(mut self, units: i64) -> Self {
        self.daily_capacity = Some(units);
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
