//! Product records and stock arithmetic.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Whether a listed vehicle is new or used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCondition {
    Used,
    New,
}

impl ProductCondition {
    /// Returns the condition as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCondition::Used => "USED",
            ProductCondition::New => "NEW",
        }
    }
}

impl std::fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductCondition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USED" => Ok(ProductCondition::Used),
            "NEW" => Ok(ProductCondition::New),
            _ => Err(DomainError::UnknownCondition(s.to_string())),
        }
    }
}

/// A product listed in the catalog.
///
/// Only `stock` carries invariants: it is unsigned and is changed
/// exclusively through conditional deltas in the store. The descriptive
/// fields are opaque strings passed through to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub gearbox: String,
    pub tank: String,
    pub basic_info: String,
    pub region: String,
    pub color: String,
    pub more_details: String,
    pub photos: Vec<String>,
    #[serde(rename = "status")]
    pub condition: Option<ProductCondition>,
    pub rating: f64,
    pub stock: u32,
}

impl Product {
    /// Creates a product with the given name and stock and empty descriptive fields.
    pub fn new(name: impl Into<String>, stock: u32) -> Self {
        NewProduct {
            name: name.into(),
            stock,
            ..Default::default()
        }
        .into_product()
    }
}

/// Attributes supplied when creating a product.
///
/// Every field is optional on the wire; stock and rating default to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProduct {
    pub name: String,
    pub price: String,
    pub gearbox: String,
    pub tank: String,
    pub basic_info: String,
    pub region: String,
    pub color: String,
    pub more_details: String,
    pub photos: Vec<String>,
    #[serde(rename = "status")]
    pub condition: Option<ProductCondition>,
    pub rating: f64,
    pub stock: u32,
}

impl NewProduct {
    /// Assigns a fresh id and produces the stored product.
    pub fn into_product(self) -> Product {
        Product {
            id: ProductId::new(),
            name: self.name,
            price: self.price,
            gearbox: self.gearbox,
            tank: self.tank,
            basic_info: self.basic_info,
            region: self.region,
            color: self.color,
            more_details: self.more_details,
            photos: self.photos,
            condition: self.condition,
            rating: self.rating,
            stock: self.stock,
        }
    }
}

/// Applies a signed delta to a stock count.
///
/// Returns `None` when the result would be negative or would not fit the
/// stock counter; callers must treat that as a rejected update.
pub fn apply_stock_delta(stock: u32, delta: i64) -> Option<u32> {
    let next = i64::from(stock).checked_add(delta)?;
    u32::try_from(next).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_defaults() {
        let product = Product::new("Corolla", 4);
        assert_eq!(product.stock, 4);
        assert_eq!(product.rating, 0.0);
        assert!(product.condition.is_none());
        assert!(product.photos.is_empty());
    }

    #[test]
    fn stock_delta_never_goes_negative() {
        assert_eq!(apply_stock_delta(10, -4), Some(6));
        assert_eq!(apply_stock_delta(3, -3), Some(0));
        assert_eq!(apply_stock_delta(3, -4), None);
        assert_eq!(apply_stock_delta(0, 7), Some(7));
    }

    #[test]
    fn stock_delta_rejects_overflow() {
        assert_eq!(apply_stock_delta(u32::MAX, 1), None);
        assert_eq!(apply_stock_delta(0, i64::MIN), None);
    }

    #[test]
    fn condition_parses_case_insensitively() {
        assert_eq!("used".parse::<ProductCondition>().unwrap(), ProductCondition::Used);
        assert_eq!("NEW".parse::<ProductCondition>().unwrap(), ProductCondition::New);
        assert!("refurbished".parse::<ProductCondition>().is_err());
    }

    #[test]
    fn new_product_deserializes_with_missing_fields() {
        let draft: NewProduct = serde_json::from_value(serde_json::json!({
            "name": "Civic",
            "status": "USED",
            "basicInfo": "2015, 120k km"
        }))
        .unwrap();
        assert_eq!(draft.name, "Civic");
        assert_eq!(draft.condition, Some(ProductCondition::Used));
        assert_eq!(draft.basic_info, "2015, 120k km");
        assert_eq!(draft.stock, 0);
    }

    #[test]
    fn product_serializes_condition_as_status() {
        let mut product = Product::new("Golf", 1);
        product.condition = Some(ProductCondition::New);
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["status"], "NEW");
        assert_eq!(json["stock"], 1);
    }
}
