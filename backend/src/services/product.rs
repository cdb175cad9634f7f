//! Product catalogue service

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use shared::{NewProduct, Product, ProductUpdate, Supplier, SupplierRef};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, ProductRepository, SupplierRepository, DUPLICATE_SKU};

/// A product with its suppliers resolved to `{id, name, email}`
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithSuppliers {
    #[serde(flatten)]
    pub product: Product,
    pub suppliers: Vec<SupplierRef>,
}

/// Product service
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn InventoryStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// List products, optionally filtered by a name/SKU search term
    pub async fn list_products(&self, search: Option<&str>) -> AppResult<Vec<ProductWithSuppliers>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let products = self.store.list_products(search).await?;
        self.resolve_suppliers(products).await
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<ProductWithSuppliers> {
        let product = self.find(id).await?;
        let mut resolved = self.resolve_suppliers(vec![product]).await?;
        resolved
            .pop()
            .ok_or_else(|| AppError::Internal("Product lost while resolving suppliers".to_string()))
    }

    pub async fn create_product(&self, input: NewProduct) -> AppResult<Product> {
        let product = input.into_product(Uuid::new_v4(), Utc::now())?;

        // The store enforces uniqueness too; this gives the common case a
        // clean answer without relying on the insert failing.
        if self.store.sku_exists(&product.sku).await? {
            return Err(AppError::Conflict(DUPLICATE_SKU.to_string()));
        }

        self.store.insert_product(&product).await?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");

        Ok(product)
    }

    pub async fn update_product(&self, id: Uuid, input: ProductUpdate) -> AppResult<Product> {
        let product = self
            .store
            .update_product(id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))?;

        tracing::info!(product_id = %product.id, "Product updated");

        Ok(product)
    }

    /// Delete a product. Transactions referencing it are kept.
    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_product(id).await? {
            return Err(AppError::not_found("Product"));
        }

        tracing::info!(product_id = %id, "Product deleted");

        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))
    }

    /// Look up every referenced supplier in one query. Ids of deleted
    /// suppliers are skipped.
    async fn resolve_suppliers(&self, products: Vec<Product>) -> AppResult<Vec<ProductWithSuppliers>> {
        let mut ids: Vec<Uuid> = products
            .iter()
            .flat_map(|p| p.supplier_ids.iter().copied())
            .collect();
        ids.sort();
        ids.dedup();

        let suppliers: HashMap<Uuid, Supplier> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .get_suppliers(&ids)
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect()
        };

        Ok(products
            .into_iter()
            .map(|product| {
                let suppliers = product
                    .supplier_ids
                    .iter()
                    .filter_map(|id| suppliers.get(id).map(Supplier::summary))
                    .collect();
                ProductWithSuppliers { product, suppliers }
            })
            .collect())
    }
}
