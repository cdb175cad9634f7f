//! Read-only inventory reports

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Product;

/// Products at or below their reorder level
pub fn low_stock(products: &[Product]) -> Vec<Product> {
    products.iter().filter(|p| p.is_low_stock()).cloned().collect()
}

/// A money total fell outside the range `Decimal` can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Amount exceeds the supported range")]
pub struct AmountOverflow;

/// Total value of on-hand stock at average cost
pub fn inventory_value(products: &[Product]) -> Result<Decimal, AmountOverflow> {
    products.iter().try_fold(Decimal::ZERO, |total, product| {
        product
            .stock_value()
            .and_then(|value| total.checked_add(value))
            .ok_or(AmountOverflow)
    })
}

/// Products that list `supplier_id` among their suppliers
pub fn supplied_by(products: &[Product], supplier_id: Uuid) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.is_supplied_by(supplier_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn product(stock_qty: i32, reorder_level: i32, avg_cost: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: format!("P{}", stock_qty),
            sku: Uuid::new_v4().to_string(),
            unit: "pcs".to_string(),
            stock_qty,
            reorder_level,
            avg_cost: Decimal::from_str(avg_cost).unwrap(),
            supplier_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_inventory_value_exact() {
        let products = vec![product(3, 0, "2.00"), product(5, 0, "1.50")];
        assert_eq!(inventory_value(&products), Ok(Decimal::from_str("13.50").unwrap()));
    }

    #[test]
    fn test_inventory_value_overflow_is_error() {
        let mut huge = product(10, 0, "0");
        huge.avg_cost = Decimal::from_scientific("1e28").unwrap();
        assert_eq!(inventory_value(&[huge]), Err(AmountOverflow));

        let mut near_max = product(1, 0, "0");
        near_max.avg_cost = Decimal::MAX;
        assert_eq!(inventory_value(&[near_max.clone(), near_max]), Err(AmountOverflow));
    }

    #[test]
    fn test_inventory_value_empty() {
        assert_eq!(inventory_value(&[]), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_low_stock_includes_equal() {
        let products = vec![product(5, 5, "1"), product(6, 5, "1"), product(0, 0, "1")];
        let low: Vec<i32> = low_stock(&products).iter().map(|p| p.stock_qty).collect();
        assert_eq!(low, vec![5, 0]);
    }

    #[test]
    fn test_supplied_by() {
        let supplier = Uuid::new_v4();
        let mut a = product(1, 1, "1");
        a.supplier_ids = vec![Uuid::new_v4(), supplier];
        let b = product(2, 1, "1");

        let found = supplied_by(&[a.clone(), b], supplier);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
    }

    proptest! {
        #[test]
        fn prop_low_stock_is_exact_partition(
            levels in prop::collection::vec((0i32..30, 0i32..30), 0..25)
        ) {
            let products: Vec<Product> = levels
                .iter()
                .map(|(stock, reorder)| product(*stock, *reorder, "1"))
                .collect();
            let low = low_stock(&products);

            let expected = products.iter().filter(|p| p.stock_qty <= p.reorder_level).count();
            prop_assert_eq!(low.len(), expected);
            prop_assert!(low.iter().all(|p| p.stock_qty <= p.reorder_level));
        }

        #[test]
        fn prop_inventory_value_is_sum(
            rows in prop::collection::vec((0i32..1000, 0i64..100_000), 0..25)
        ) {
            let products: Vec<Product> = rows
                .iter()
                .map(|(stock, cents)| {
                    let mut p = product(*stock, 0, "0");
                    p.avg_cost = Decimal::new(*cents, 2);
                    p
                })
                .collect();

            let expected: Decimal = rows
                .iter()
                .map(|(stock, cents)| Decimal::from(*stock) * Decimal::new(*cents, 2))
                .sum();
            prop_assert_eq!(inventory_value(&products), Ok(expected));
        }
    }
}
