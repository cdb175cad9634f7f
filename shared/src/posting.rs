//! Stock posting rules
//!
//! A purchase adds to stock and reprices the weighted-average cost. A sale
//! removes stock at the current cost and is refused when it would take the
//! on-hand quantity below zero. Stores apply these rules line by line inside
//! whatever atomic unit they provide, so a failing line leaves no trace.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LineItem, PostingRequest, Product, TxType};

/// Reasons a posting is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostingError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_id: Uuid,
        name: String,
        available: i32,
        requested: i32,
    },

    #[error("Stock quantity for {name} would exceed the supported maximum")]
    StockOverflow { product_id: Uuid, name: String },

    #[error("Stock value for {name} would exceed the supported range")]
    CostOverflow { product_id: Uuid, name: String },
}

/// Average unit cost after receiving `quantity` units at `unit_price`.
///
/// Falls back to `unit_price` when the resulting quantity is not positive.
/// Returns `None` when the combined stock value leaves the `Decimal` range.
pub fn weighted_average_cost(
    stock_qty: i32,
    avg_cost: Decimal,
    quantity: i32,
    unit_price: Decimal,
) -> Option<Decimal> {
    let new_qty = i64::from(stock_qty) + i64::from(quantity);
    if new_qty <= 0 {
        return Some(unit_price);
    }
    let held = avg_cost.checked_mul(Decimal::from(stock_qty))?;
    let received = unit_price.checked_mul(Decimal::from(quantity))?;
    let total_value = held.checked_add(received)?;
    Some(total_value.checked_div(Decimal::from(new_qty))?.normalize())
}

/// Apply one line to a product in place. On error the product is untouched.
pub fn apply_line(product: &mut Product, tx_type: TxType, item: &LineItem) -> Result<(), PostingError> {
    match tx_type {
        TxType::Purchase => {
            let new_qty = product.stock_qty.checked_add(item.quantity).ok_or_else(|| {
                PostingError::StockOverflow {
                    product_id: product.id,
                    name: product.name.clone(),
                }
            })?;
            let avg_cost = weighted_average_cost(
                product.stock_qty,
                product.avg_cost,
                item.quantity,
                item.unit_price,
            )
            .ok_or_else(|| PostingError::CostOverflow {
                product_id: product.id,
                name: product.name.clone(),
            })?;
            product.avg_cost = avg_cost;
            product.stock_qty = new_qty;
        }
        TxType::Sale => {
            if product.stock_qty < item.quantity {
                return Err(PostingError::InsufficientStock {
                    product_id: product.id,
                    name: product.name.clone(),
                    available: product.stock_qty,
                    requested: item.quantity,
                });
            }
            product.stock_qty -= item.quantity;
        }
    }
    Ok(())
}

/// Run every line of `request` against copies of the products returned by
/// `fetch`, carrying state forward when a product appears on several lines.
///
/// Returns the touched products in their final state, in first-seen order.
/// Nothing is returned on error, so the caller has nothing to roll back.
pub fn stage_posting<F>(request: &PostingRequest, mut fetch: F) -> Result<Vec<Product>, PostingError>
where
    F: FnMut(Uuid) -> Option<Product>,
{
    let mut staged: Vec<Product> = Vec::new();

    for item in &request.items {
        let index = match staged.iter().position(|p| p.id == item.product_id) {
            Some(index) => index,
            None => {
                let product =
                    fetch(item.product_id).ok_or(PostingError::ProductNotFound(item.product_id))?;
                staged.push(product);
                staged.len() - 1
            }
        };
        apply_line(&mut staged[index], request.tx_type, item)?;
    }

    Ok(staged)
}
