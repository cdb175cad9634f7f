//! Persistence for products, suppliers and the transaction log
//!
//! Services only ever see an [`InventoryStore`] handle. Two implementations
//! exist: [`PgStore`] over PostgreSQL and [`MemoryStore`] for development
//! and tests. Both post a transaction as one atomic unit: either every line
//! is applied and the record is appended, or nothing changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{PostingRequest, Product, ProductUpdate, Supplier, Transaction};
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Message returned when a product is created with a SKU already in use
pub const DUPLICATE_SKU: &str = "SKU already exists";

/// Message returned when a supplier email is already in use
pub const DUPLICATE_EMAIL: &str = "Supplier email already exists";

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, oldest first, optionally filtered by a name/SKU search term
    async fn list_products(&self, search: Option<&str>) -> AppResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// Products with the given ids; unknown ids are skipped
    async fn get_products(&self, ids: &[Uuid]) -> AppResult<Vec<Product>>;

    async fn sku_exists(&self, sku: &str) -> AppResult<bool>;

    /// Insert a new product. Fails with a conflict when the SKU is taken.
    async fn insert_product(&self, product: &Product) -> AppResult<()>;

    /// Apply a partial update to the current row while holding the same lock
    /// a posting takes, so concurrent stock changes are not overwritten.
    /// Returns `None` if the product does not exist.
    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> AppResult<Option<Product>>;

    async fn delete_product(&self, id: Uuid) -> AppResult<bool>;

    /// Products with `stock_qty <= reorder_level`
    async fn low_stock_products(&self) -> AppResult<Vec<Product>>;

    async fn products_by_supplier(&self, supplier_id: Uuid) -> AppResult<Vec<Product>>;
}

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>>;

    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>>;

    /// Suppliers with the given ids; unknown ids are skipped
    async fn get_suppliers(&self, ids: &[Uuid]) -> AppResult<Vec<Supplier>>;

    /// Insert a new supplier. Fails with a conflict when the email is taken.
    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()>;

    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool>;

    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Newest first
    async fn list_transactions(&self) -> AppResult<Vec<Transaction>>;

    /// Sale transactions dated on or after `since`
    async fn sales_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Transaction>>;

    /// Apply every line of `request` to product stock and append the record.
    ///
    /// Concurrent postings touching the same product are serialized, and a
    /// failing line rolls back all earlier lines of the same request.
    async fn post_transaction(&self, request: PostingRequest) -> AppResult<Transaction>;
}

/// The store handle shared by all services
#[async_trait]
pub trait InventoryStore: ProductRepository + SupplierRepository + TransactionRepository {
    fn backend_name(&self) -> &'static str;

    /// Check that the store answers
    async fn ping(&self) -> AppResult<()>;

    /// Release the underlying resources
    async fn close(&self);
}
