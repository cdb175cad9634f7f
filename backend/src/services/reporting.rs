//! Reporting service for stock levels, valuation and data export

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::Product;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, ProductRepository};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn InventoryStore>,
}

/// One row of the low-stock CSV export
#[derive(Debug, Serialize)]
pub struct LowStockCsvRow {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub stock_qty: i32,
    pub reorder_level: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub avg_cost: Decimal,
}

impl From<&Product> for LowStockCsvRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit: product.unit.clone(),
            stock_qty: product.stock_qty,
            reorder_level: product.reorder_level,
            avg_cost: product.avg_cost,
        }
    }
}

impl ReportingService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Products at or below their reorder level
    pub async fn low_stock(&self) -> AppResult<Vec<Product>> {
        self.store.low_stock_products().await
    }

    /// Total stock value at average cost
    pub async fn inventory_value(&self) -> AppResult<Decimal> {
        let products = self.store.list_products(None).await?;
        Ok(shared::reporting::inventory_value(&products)?)
    }

    /// Products listing `supplier_id`. No matches is reported as not found.
    pub async fn products_by_supplier(&self, supplier_id: Uuid) -> AppResult<Vec<Product>> {
        let products = self.store.products_by_supplier(supplier_id).await?;
        if products.is_empty() {
            return Err(AppError::NotFound(
                "No products found for this supplier".to_string(),
            ));
        }
        Ok(products)
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
