//! Validation utilities for Stockroom inputs

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::LineItem;

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err("Invalid email format"),
    }
}

/// Trim a required text field, rejecting blanks
pub fn required_text(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn non_negative_qty(field: &str, value: i32) -> Result<i32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field, format!("{} cannot be negative", field)));
    }
    Ok(value)
}

pub fn non_negative_cost(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, format!("{} cannot be negative", field)));
    }
    Ok(value)
}

/// Quantity must be at least 1 and unit price must not be negative
pub fn validate_line_item(index: usize, item: &LineItem) -> Result<(), ValidationError> {
    if item.quantity < 1 {
        return Err(ValidationError::new(
            format!("items[{}].quantity", index),
            format!("Item {}: quantity must be at least 1", index + 1),
        ));
    }
    if item.unit_price < Decimal::ZERO {
        return Err(ValidationError::new(
            format!("items[{}].unitPrice", index),
            format!("Item {}: unit price cannot be negative", index + 1),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("orders@supplier.co").is_ok());
        assert!(validate_email("orders.supplier.co").is_err());
        assert!(validate_email("@supplier.co").is_err());
        assert!(validate_email("orders@localhost").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(" kg ".to_string())), Some("kg".to_string()));
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_cost_bounds() {
        assert!(non_negative_cost("avgCost", Decimal::ZERO).is_ok());
        assert!(non_negative_cost("avgCost", Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_line_item_bounds() {
        let mut item = LineItem {
            product_id: Uuid::new_v4(),
            quantity: 1,
            unit_price: Decimal::ZERO,
        };
        assert!(validate_line_item(0, &item).is_ok());

        item.unit_price = Decimal::new(-5, 1);
        let err = validate_line_item(3, &item).unwrap_err();
        assert_eq!(err.field, "items[3].unitPrice");
        assert_eq!(err.message, "Item 4: unit price cannot be negative");
    }
}
