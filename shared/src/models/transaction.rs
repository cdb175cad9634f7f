//! Stock transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{optional_text, validate_line_item, ValidationError};

/// Kind of stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxType {
    /// Goods received; raises stock and reprices average cost
    Purchase,
    /// Goods issued; lowers stock
    Sale,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Purchase => "PURCHASE",
            TxType::Sale => "SALE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PURCHASE" => Some(TxType::Purchase),
            "SALE" => Some(TxType::Sale),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product line of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

/// A recorded purchase or sale. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub tx_type: TxType,
    pub tx_date: DateTime<Utc>,
    /// Items exactly as submitted
    pub items: Vec<LineItem>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw transaction request as received from a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub tx_type: Option<String>,
    pub items: Option<Vec<LineItem>>,
    pub note: Option<String>,
    pub tx_date: Option<DateTime<Utc>>,
}

/// A validated transaction ready to be posted
#[derive(Debug, Clone, PartialEq)]
pub struct PostingRequest {
    pub tx_type: TxType,
    pub items: Vec<LineItem>,
    pub note: Option<String>,
    pub tx_date: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn validate(self) -> Result<PostingRequest, ValidationError> {
        let tx_type = self
            .tx_type
            .as_deref()
            .and_then(TxType::parse)
            .ok_or_else(|| ValidationError::new("txType", "Invalid transaction type"))?;

        let items = match self.items {
            Some(items) if !items.is_empty() => items,
            _ => {
                return Err(ValidationError::new(
                    "items",
                    "At least one item is required",
                ))
            }
        };
        for (index, item) in items.iter().enumerate() {
            validate_line_item(index, item)?;
        }

        Ok(PostingRequest {
            tx_type,
            items,
            note: optional_text(self.note),
            tx_date: self.tx_date,
        })
    }
}

impl PostingRequest {
    /// Build the transaction record, dating it `now` unless a date was supplied
    pub fn into_transaction(self, id: Uuid, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            tx_type: self.tx_type,
            tx_date: self.tx_date.unwrap_or(now),
            items: self.items,
            note: self.note,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price: i64) -> LineItem {
        LineItem {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price: Decimal::from(unit_price),
        }
    }

    #[test]
    fn test_tx_type_wire_format() {
        assert_eq!(serde_json::to_string(&TxType::Purchase).unwrap(), "\"PURCHASE\"");
        assert_eq!(TxType::parse("SALE"), Some(TxType::Sale));
        assert_eq!(TxType::parse("sale"), None);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let input = NewTransaction {
            tx_type: Some("RETURN".to_string()),
            items: Some(vec![item(1, 1)]),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().message, "Invalid transaction type");
    }

    #[test]
    fn test_empty_items_rejected() {
        let input = NewTransaction {
            tx_type: Some("SALE".to_string()),
            items: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().message, "At least one item is required");
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let input = NewTransaction {
            tx_type: Some("PURCHASE".to_string()),
            items: Some(vec![item(2, 1), item(0, 1)]),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert_eq!(err.field, "items[1].quantity");
    }

    #[test]
    fn test_date_defaults_to_now() {
        let now = Utc::now();
        let request = NewTransaction {
            tx_type: Some("PURCHASE".to_string()),
            items: Some(vec![item(2, 3)]),
            note: Some("  first delivery ".to_string()),
            tx_date: None,
        }
        .validate()
        .unwrap();

        let tx = request.into_transaction(Uuid::new_v4(), now);
        assert_eq!(tx.tx_date, now);
        assert_eq!(tx.note.as_deref(), Some("first delivery"));
        assert_eq!(tx.items[0].line_total(), Some(Decimal::from(6)));
    }

    #[test]
    fn test_request_json_shape() {
        let json = r#"{
            "txType": "SALE",
            "items": [{"productId": "67e55044-10b1-426f-9247-bb680e5fe0c8", "quantity": 2, "unitPrice": 4.25}]
        }"#;
        let input: NewTransaction = serde_json::from_str(json).unwrap();
        let request = input.validate().unwrap();
        assert_eq!(request.tx_type, TxType::Sale);
        assert_eq!(request.items[0].unit_price, Decimal::new(425, 2));
    }
}
