//! WebAssembly module for the Stockroom inventory service
//!
//! Lets the browser run the same rules the server applies:
//! - Purchase cost preview (weighted-average cost)
//! - Sale stock check
//! - Low-stock flag
//! - Form validation before submit

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::{apply_line, LineItem, NewProduct, NewSupplier, NewTransaction, Product, TxType};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

/// Average unit cost after receiving `quantity` units at `unit_price`.
/// `undefined` when the stock value is out of range.
#[wasm_bindgen]
pub fn preview_purchase_cost(
    stock_qty: i32,
    avg_cost: f64,
    quantity: i32,
    unit_price: f64,
) -> Option<f64> {
    shared::weighted_average_cost(stock_qty, to_decimal(avg_cost), quantity, to_decimal(unit_price))
        .and_then(|cost| cost.to_f64())
}

/// Error message if `quantity` is not a valid sale of `name` from stock
#[wasm_bindgen]
pub fn check_sale(name: &str, stock_qty: i32, quantity: i32) -> Option<String> {
    let now = Utc::now();
    let mut product = Product {
        id: Uuid::nil(),
        name: name.to_string(),
        sku: String::new(),
        unit: shared::DEFAULT_UNIT.to_string(),
        stock_qty,
        reorder_level: 0,
        avg_cost: Decimal::ZERO,
        supplier_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    let item = LineItem {
        product_id: product.id,
        quantity,
        unit_price: Decimal::ZERO,
    };
    if let Err(e) = shared::validate_line_item(0, &item) {
        return Some(e.message);
    }

    apply_line(&mut product, TxType::Sale, &item)
        .err()
        .map(|e| e.to_string())
}

#[wasm_bindgen]
pub fn is_low_stock(stock_qty: i32, reorder_level: i32) -> bool {
    stock_qty <= reorder_level
}

/// Validate a transaction form. Returns the first error, if any.
#[wasm_bindgen]
pub fn validate_transaction_json(json: &str) -> Option<String> {
    match serde_json::from_str::<NewTransaction>(json) {
        Ok(input) => input.validate().err().map(|e| e.message),
        Err(e) => Some(format!("Invalid transaction JSON: {}", e)),
    }
}

/// Validate a product form. Returns the first error, if any.
#[wasm_bindgen]
pub fn validate_product_json(json: &str) -> Option<String> {
    match serde_json::from_str::<NewProduct>(json) {
        Ok(input) => input.into_product(Uuid::nil(), Utc::now()).err().map(|e| e.message),
        Err(e) => Some(format!("Invalid product JSON: {}", e)),
    }
}

/// Validate a supplier form. Returns the first error, if any.
#[wasm_bindgen]
pub fn validate_supplier_json(json: &str) -> Option<String> {
    match serde_json::from_str::<NewSupplier>(json) {
        Ok(input) => input.into_supplier(Uuid::nil(), Utc::now()).err().map(|e| e.message),
        Err(e) => Some(format!("Invalid supplier JSON: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_cost_preview() {
        let cost = preview_purchase_cost(10, 2.0, 10, 4.0).unwrap();
        assert!((cost - 3.0).abs() < 0.0001);

        // Nothing on hand: the new price is the cost
        let cost = preview_purchase_cost(0, 0.0, 5, 1.25).unwrap();
        assert!((cost - 1.25).abs() < 0.0001);
    }

    #[test]
    fn test_purchase_cost_preview_out_of_range() {
        assert_eq!(preview_purchase_cost(i32::MAX, 1e28, i32::MAX, 1e28), None);
    }

    #[test]
    fn test_check_sale() {
        assert_eq!(check_sale("Widget", 20, 20), None);
        assert_eq!(
            check_sale("Widget", 20, 25).as_deref(),
            Some("Insufficient stock for Widget. Available: 20, Requested: 25")
        );
    }

    #[test]
    fn test_check_sale_rejects_non_positive_quantity() {
        assert_eq!(
            check_sale("Widget", 5, -1).as_deref(),
            Some("Item 1: quantity must be at least 1")
        );
        assert_eq!(
            check_sale("Widget", 5, 0).as_deref(),
            Some("Item 1: quantity must be at least 1")
        );
        assert_eq!(
            check_sale("Widget", i32::MIN, i32::MIN).as_deref(),
            Some("Item 1: quantity must be at least 1")
        );
    }

    #[test]
    fn test_low_stock_includes_equality() {
        assert!(is_low_stock(5, 5));
        assert!(is_low_stock(0, 0));
        assert!(!is_low_stock(6, 5));
    }

    #[test]
    fn test_validate_transaction() {
        let valid = r#"{"txType":"SALE","items":[{"productId":"00000000-0000-0000-0000-000000000001","quantity":1,"unitPrice":2.5}]}"#;
        assert_eq!(validate_transaction_json(valid), None);

        let bad_type = r#"{"txType":"LOAN","items":[]}"#;
        assert_eq!(
            validate_transaction_json(bad_type).as_deref(),
            Some("Invalid transaction type")
        );

        assert!(validate_transaction_json("not json")
            .unwrap()
            .starts_with("Invalid transaction JSON"));
    }

    #[test]
    fn test_validate_forms() {
        assert_eq!(
            validate_product_json(r#"{"name":"Widget"}"#).as_deref(),
            Some("Name and SKU are required")
        );
        assert_eq!(validate_product_json(r#"{"name":"Widget","sku":"W-1"}"#), None);

        assert_eq!(
            validate_supplier_json(r#"{"email":"a@acme.test"}"#).as_deref(),
            Some("Supplier name is required")
        );
    }
}
