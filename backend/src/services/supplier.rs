//! Supplier directory service

use std::sync::Arc;

use chrono::Utc;
use shared::{NewSupplier, Supplier, SupplierUpdate};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, SupplierRepository};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn InventoryStore>,
}

impl SupplierService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        self.store.list_suppliers().await
    }

    pub async fn get_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        self.store
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier"))
    }

    pub async fn create_supplier(&self, input: NewSupplier) -> AppResult<Supplier> {
        let supplier = input.into_supplier(Uuid::new_v4(), Utc::now())?;
        self.store.insert_supplier(&supplier).await?;

        tracing::info!(supplier_id = %supplier.id, "Supplier created");

        Ok(supplier)
    }

    pub async fn update_supplier(&self, id: Uuid, input: SupplierUpdate) -> AppResult<Supplier> {
        let mut supplier = self.get_supplier(id).await?;
        input.apply(&mut supplier, Utc::now())?;

        if !self.store.update_supplier(&supplier).await? {
            return Err(AppError::not_found("Supplier"));
        }

        tracing::info!(supplier_id = %supplier.id, "Supplier updated");

        Ok(supplier)
    }

    /// Delete a supplier. Products keep the id in their supplier list.
    pub async fn delete_supplier(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_supplier(id).await? {
            return Err(AppError::not_found("Supplier"));
        }

        tracing::info!(supplier_id = %id, "Supplier deleted");

        Ok(())
    }
}
