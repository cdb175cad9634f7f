//! Product models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{non_negative_cost, non_negative_qty, optional_text, required_text, ValidationError};

/// Unit label applied when a product is created without one
pub const DEFAULT_UNIT: &str = "pcs";

/// Reorder threshold applied when a product is created without one
pub const DEFAULT_REORDER_LEVEL: i32 = 10;

/// A stocked product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unique stock-keeping code
    pub sku: String,
    pub unit: String,
    /// On-hand quantity, never negative
    pub stock_qty: i32,
    /// At or below this quantity the product counts as low stock
    pub reorder_level: i32,
    /// Weighted-average unit cost
    pub avg_cost: Decimal,
    /// Suppliers for this product. Not checked against the supplier store.
    pub supplier_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock_qty <= self.reorder_level
    }

    /// Value of the on-hand stock at average cost, `None` if out of range
    pub fn stock_value(&self) -> Option<Decimal> {
        Decimal::from(self.stock_qty).checked_mul(self.avg_cost)
    }

    pub fn is_supplied_by(&self, supplier_id: Uuid) -> bool {
        self.supplier_ids.contains(&supplier_id)
    }

    /// Case-insensitive substring match on name or SKU
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.sku.to_lowercase().contains(&term)
    }

    pub fn summary(&self) -> ProductRef {
        ProductRef {
            id: self.id,
            name: self.name.clone(),
            sku: self.sku.clone(),
        }
    }
}

/// Minimal product view embedded in transaction listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
}

/// Input for creating a product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub unit: Option<String>,
    pub stock_qty: Option<i32>,
    pub reorder_level: Option<i32>,
    pub avg_cost: Option<Decimal>,
    pub supplier_ids: Option<Vec<Uuid>>,
}

impl NewProduct {
    /// Validate the input and build a product with defaults filled in
    pub fn into_product(self, id: Uuid, now: DateTime<Utc>) -> Result<Product, ValidationError> {
        let (name, sku) = match (
            self.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) {
            (Some(name), Some(sku)) => (name.to_string(), sku.to_string()),
            _ => {
                return Err(ValidationError::new(
                    "name/sku",
                    "Name and SKU are required",
                ))
            }
        };

        let stock_qty = non_negative_qty("stockQty", self.stock_qty.unwrap_or(0))?;
        let reorder_level =
            non_negative_qty("reorderLevel", self.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL))?;
        let avg_cost = non_negative_cost("avgCost", self.avg_cost.unwrap_or(Decimal::ZERO))?;

        Ok(Product {
            id,
            name,
            sku,
            unit: optional_text(self.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            stock_qty,
            reorder_level,
            avg_cost,
            supplier_ids: self.supplier_ids.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update for a product. The SKU cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub stock_qty: Option<i32>,
    pub reorder_level: Option<i32>,
    pub avg_cost: Option<Decimal>,
    pub supplier_ids: Option<Vec<Uuid>>,
}

impl ProductUpdate {
    /// Apply the update in place. Nothing is changed if validation fails.
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let name = self.name.map(|n| required_text("name", &n)).transpose()?;
        let stock_qty = self.stock_qty.map(|q| non_negative_qty("stockQty", q)).transpose()?;
        let reorder_level = self
            .reorder_level
            .map(|q| non_negative_qty("reorderLevel", q))
            .transpose()?;
        let avg_cost = self.avg_cost.map(|c| non_negative_cost("avgCost", c)).transpose()?;

        if let Some(name) = name {
            product.name = name;
        }
        if let Some(unit) = self.unit {
            product.unit = unit.trim().to_string();
        }
        if let Some(stock_qty) = stock_qty {
            product.stock_qty = stock_qty;
        }
        if let Some(reorder_level) = reorder_level {
            product.reorder_level = reorder_level;
        }
        if let Some(avg_cost) = avg_cost {
            product.avg_cost = avg_cost;
        }
        if let Some(supplier_ids) = self.supplier_ids {
            product.supplier_ids = supplier_ids;
        }
        product.updated_at = now;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn new_product(name: &str, sku: &str) -> NewProduct {
        NewProduct {
            name: Some(name.to_string()),
            sku: Some(sku.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let product = new_product("Widget", "W-1")
            .into_product(Uuid::new_v4(), Utc::now())
            .unwrap();

        assert_eq!(product.unit, "pcs");
        assert_eq!(product.stock_qty, 0);
        assert_eq!(product.reorder_level, 10);
        assert_eq!(product.avg_cost, Decimal::ZERO);
        assert!(product.supplier_ids.is_empty());
    }

    #[test]
    fn test_name_and_sku_trimmed() {
        let product = new_product("  Widget ", " W-1 ")
            .into_product(Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.sku, "W-1");
    }

    #[test]
    fn test_missing_sku_rejected() {
        let input = NewProduct {
            name: Some("Widget".to_string()),
            ..Default::default()
        };
        let err = input.into_product(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert_eq!(err.message, "Name and SKU are required");
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = new_product("   ", "W-1")
            .into_product(Uuid::new_v4(), Utc::now())
            .unwrap_err();
        assert_eq!(err.message, "Name and SKU are required");
    }

    #[test]
    fn test_negative_stock_rejected() {
        let mut input = new_product("Widget", "W-1");
        input.stock_qty = Some(-1);
        let err = input.into_product(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert_eq!(err.field, "stockQty");
    }

    #[test]
    fn test_low_stock_boundary() {
        let mut product = new_product("Widget", "W-1")
            .into_product(Uuid::new_v4(), Utc::now())
            .unwrap();
        product.reorder_level = 5;

        product.stock_qty = 5;
        assert!(product.is_low_stock());
        product.stock_qty = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut product = new_product("Widget", "W-1")
            .into_product(Uuid::new_v4(), Utc::now())
            .unwrap();
        let update = ProductUpdate {
            name: Some("Gadget".to_string()),
            avg_cost: Some(Decimal::from_str("-1").unwrap()),
            ..Default::default()
        };

        assert!(update.apply(&mut product, Utc::now()).is_err());
        assert_eq!(product.name, "Widget");
    }

    #[test]
    fn test_update_applies_present_fields() {
        let mut product = new_product("Widget", "W-1")
            .into_product(Uuid::new_v4(), Utc::now())
            .unwrap();
        let supplier = Uuid::new_v4();
        let update = ProductUpdate {
            reorder_level: Some(3),
            supplier_ids: Some(vec![supplier]),
            ..Default::default()
        };

        update.apply(&mut product, Utc::now()).unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.reorder_level, 3);
        assert!(product.is_supplied_by(supplier));
    }

    #[test]
    fn test_search_matches_name_or_sku() {
        let product = new_product("Blue Widget", "BW-100")
            .into_product(Uuid::new_v4(), Utc::now())
            .unwrap();
        assert!(product.matches_search("widget"));
        assert!(product.matches_search("bw-1"));
        assert!(!product.matches_search("gadget"));
    }
}
