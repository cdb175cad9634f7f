//! Supplier models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{optional_text, required_text, validate_email, ValidationError};

/// A supplier that products may reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    /// Unique across suppliers
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn summary(&self) -> SupplierRef {
        SupplierRef {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Supplier fields resolved onto a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Input for creating a supplier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewSupplier {
    pub fn into_supplier(self, id: Uuid, now: DateTime<Utc>) -> Result<Supplier, ValidationError> {
        let name = match optional_text(self.name) {
            Some(name) => name,
            None => return Err(ValidationError::new("name", "Supplier name is required")),
        };
        let email = match optional_text(self.email) {
            Some(email) => email,
            None => return Err(ValidationError::new("email", "Supplier email is required")),
        };
        validate_email(&email).map_err(|msg| ValidationError::new("email", msg))?;

        Ok(Supplier {
            id,
            name,
            email,
            phone: optional_text(self.phone),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update for a supplier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl SupplierUpdate {
    pub fn apply(self, supplier: &mut Supplier, now: DateTime<Utc>) -> Result<(), ValidationError> {
        let name = self.name.map(|n| required_text("name", &n)).transpose()?;
        let email = self.email.map(|e| required_text("email", &e)).transpose()?;
        if let Some(email) = &email {
            validate_email(email).map_err(|msg| ValidationError::new("email", msg))?;
        }

        if let Some(name) = name {
            supplier.name = name;
        }
        if let Some(email) = email {
            supplier.email = email;
        }
        if self.phone.is_some() {
            supplier.phone = optional_text(self.phone);
        }
        supplier.updated_at = now;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required() {
        let input = NewSupplier {
            email: Some("sales@acme.test".to_string()),
            ..Default::default()
        };
        let err = input.into_supplier(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert_eq!(err.message, "Supplier name is required");
    }

    #[test]
    fn test_email_format_checked() {
        let input = NewSupplier {
            name: Some("Acme".to_string()),
            email: Some("not-an-email".to_string()),
            phone: None,
        };
        let err = input.into_supplier(Uuid::new_v4(), Utc::now()).unwrap_err();
        assert_eq!(err.field, "email");
    }

    #[test]
    fn test_blank_phone_dropped() {
        let supplier = NewSupplier {
            name: Some(" Acme ".to_string()),
            email: Some("sales@acme.test".to_string()),
            phone: Some("  ".to_string()),
        }
        .into_supplier(Uuid::new_v4(), Utc::now())
        .unwrap();

        assert_eq!(supplier.name, "Acme");
        assert_eq!(supplier.phone, None);
    }
}
