//! Production order model.
//!
//! An order is what the planner drags onto a line: a quantity of one style
//! for one buyer, due by a ship date. The learning curve is referenced by
//! id and resolved against master data when the order is placed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A garment order to be planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    /// Unique order identifier.
    pub id: String,
    /// Buyer (customer) name.
    pub buyer: String,
    /// Style label. Informational only; capacity comes from the curve.
    pub style: String,
    /// Units to produce.
    pub quantity: i64,
    /// Hard deadline (inclusive): the last date production may be planned.
    pub ship_date: NaiveDate,
    /// Learning-curve master data key. `None` = flat-rate planning.
    pub learning_curve_id: Option<String>,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

impl ProductionOrder {
    /// Creates an order for `quantity` units due on `ship_date`.
    pub fn new(id: impl Into<String>, quantity: i64, ship_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            buyer: String::new(),
            style: String::new(),
            quantity,
            ship_date,
            learning_curve_id: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = buyer.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// References a learning curve by id.
    pub fn with_learning_curve(mut self, profile_id: impl Into<String>) -> Self {
        self.learning_curve_id = Some(profile_id.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
