//! Product model - a catalogued nutrient or additive.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// A nutrient or additive in the catalogue.
///
/// Products have no update operation; replace one by deleting it and adding a
/// new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: String,
    /// Product name (e.g. "Grow A")
    pub name: String,
    /// Free-text category
    #[serde(rename = "type")]
    pub product_type: String,
    /// N-P-K ratio as written on the label (e.g. "3-0-1")
    pub npk: String,
    /// Manufacturer
    pub brand: String,
    /// Remaining quantity, if tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_level: Option<f64>,
}

impl Product {
    /// Category given to new products.
    pub const DEFAULT_TYPE: &'static str = "Fertilizer";

    /// Creates a product with a fresh id in the default category.
    #[must_use]
    pub fn new(name: impl Into<String>, brand: impl Into<String>, npk: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            name: name.into(),
            product_type: Self::DEFAULT_TYPE.to_string(),
            npk: npk.into(),
            brand: brand.into(),
            stock_level: None,
        }
    }

    /// Rejects a negative or non-finite stock level.
    pub fn validate(&self) -> Result<()> {
        match self.stock_level {
            Some(value) if !value.is_finite() || value < 0.0 => Err(Error::InvalidMeasurement {
                field: "stockLevel",
                value,
            }),
            _ => Ok(()),
        }
    }
}
