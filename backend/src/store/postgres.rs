//! PostgreSQL store

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    stage_posting, LineItem, PostingRequest, Product, ProductUpdate, Supplier, Transaction, TxType,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

use super::{
    InventoryStore, ProductRepository, SupplierRepository, TransactionRepository, DUPLICATE_EMAIL,
    DUPLICATE_SKU,
};
use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

const PRODUCT_COLUMNS: &str = "id, name, sku, unit, stock_qty, reorder_level, avg_cost, \
                               supplier_ids, created_at, updated_at";

const SUPPLIER_COLUMNS: &str = "id, name, email, phone, created_at, updated_at";

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    unit: String,
    stock_qty: i32,
    reorder_level: i32,
    avg_cost: Decimal,
    supplier_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            sku: row.sku,
            unit: row.unit,
            stock_qty: row.stock_qty,
            reorder_level: row.reorder_level,
            avg_cost: row.avg_cost,
            supplier_ids: row.supplier_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    tx_type: String,
    tx_date: DateTime<Utc>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ItemRow {
    transaction_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
}

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a connection pool using the configured limits
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        Ok(Self::new(db))
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))
    }

    /// Attach items to their transactions, keeping the order of `rows`
    async fn with_items(&self, rows: Vec<TransactionRow>) -> AppResult<Vec<Transaction>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT transaction_id, product_id, quantity, unit_price
            FROM transaction_items
            WHERE transaction_id = ANY($1)
            ORDER BY transaction_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.transaction_id).or_default().push(LineItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }

        rows.into_iter()
            .map(|row| {
                let tx_type = TxType::parse(&row.tx_type).ok_or_else(|| {
                    AppError::Internal(format!("Unknown transaction type: {}", row.tx_type))
                })?;
                Ok(Transaction {
                    id: row.id,
                    tx_type,
                    tx_date: row.tx_date,
                    items: grouped.remove(&row.id).unwrap_or_default(),
                    note: row.note,
                    created_at: row.created_at,
                })
            })
            .collect()
    }
}

/// Map a unique-index violation to a conflict with `message`
fn conflict_on_duplicate(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

/// ILIKE pattern matching `term` anywhere, with wildcards in the term escaped
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn list_products(&self, search: Option<&str>) -> AppResult<Vec<Product>> {
        let rows = match search {
            Some(term) => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {} FROM products WHERE name ILIKE $1 OR sku ILIKE $1 ORDER BY created_at, id",
                    PRODUCT_COLUMNS
                ))
                .bind(contains_pattern(term))
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {} FROM products ORDER BY created_at, id",
                    PRODUCT_COLUMNS
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_products(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ANY($1) ORDER BY created_at, id",
            PRODUCT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn sku_exists(&self, sku: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)")
                .bind(sku)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn insert_product(&self, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, sku, unit, stock_qty, reorder_level, avg_cost,
                                  supplier_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.unit)
        .bind(product.stock_qty)
        .bind(product.reorder_level)
        .bind(product.avg_cost)
        .bind(&product.supplier_ids)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| conflict_on_duplicate(e, DUPLICATE_SKU))?;

        Ok(())
    }

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> AppResult<Option<Product>> {
        let mut tx = self.db.begin().await?;

        // Same row lock a posting takes, so a stock change cannot land
        // between this read and the write below.
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut product: Product = row.into();
        update.apply(&mut product, Utc::now())?;

        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, unit = $2, stock_qty = $3, reorder_level = $4, avg_cost = $5,
                supplier_ids = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&product.name)
        .bind(&product.unit)
        .bind(product.stock_qty)
        .bind(product.reorder_level)
        .bind(product.avg_cost)
        .bind(&product.supplier_ids)
        .bind(product.updated_at)
        .bind(product.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(product))
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn low_stock_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE stock_qty <= reorder_level ORDER BY created_at, id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn products_by_supplier(&self, supplier_id: Uuid) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE $1 = ANY(supplier_ids) ORDER BY created_at, id",
            PRODUCT_COLUMNS
        ))
        .bind(supplier_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl SupplierRepository for PgStore {
    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers ORDER BY created_at, id",
            SUPPLIER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_suppliers(&self, ids: &[Uuid]) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = ANY($1) ORDER BY created_at, id",
            SUPPLIER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| conflict_on_duplicate(e, DUPLICATE_EMAIL))?;

        Ok(())
    }

    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $1, email = $2, phone = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(supplier.updated_at)
        .bind(supplier.id)
        .execute(&self.db)
        .await
        .map_err(|e| conflict_on_duplicate(e, DUPLICATE_EMAIL))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TransactionRepository for PgStore {
    async fn list_transactions(&self) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, tx_type, tx_date, note, created_at
            FROM transactions
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        self.with_items(rows).await
    }

    async fn sales_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, tx_type, tx_date, note, created_at
            FROM transactions
            WHERE tx_type = $1 AND tx_date >= $2
            ORDER BY tx_date
            "#,
        )
        .bind(TxType::Sale.as_str())
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        self.with_items(rows).await
    }

    async fn post_transaction(&self, request: PostingRequest) -> AppResult<Transaction> {
        let mut tx = self.db.begin().await?;

        // Lock every touched row up front, in id order, so two postings over
        // the same products cannot deadlock.
        let mut ids: Vec<Uuid> = request.items.iter().map(|item| item.product_id).collect();
        ids.sort();
        ids.dedup();

        let locked: Vec<Product> = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        // An early return drops `tx`, which rolls it back.
        let staged = stage_posting(&request, |id| locked.iter().find(|p| p.id == id).cloned())?;

        let now = Utc::now();
        for product in &staged {
            sqlx::query(
                "UPDATE products SET stock_qty = $1, avg_cost = $2, updated_at = $3 WHERE id = $4",
            )
            .bind(product.stock_qty)
            .bind(product.avg_cost)
            .bind(now)
            .bind(product.id)
            .execute(&mut *tx)
            .await?;
        }

        let transaction = request.into_transaction(Uuid::new_v4(), now);

        sqlx::query(
            r#"
            INSERT INTO transactions (id, tx_type, tx_date, note, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.tx_type.as_str())
        .bind(transaction.tx_date)
        .bind(&transaction.note)
        .bind(transaction.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in transaction.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (transaction_id, position, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(transaction.id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            transaction_id = %transaction.id,
            tx_type = %transaction.tx_type,
            lines = transaction.items.len(),
            "Transaction posted"
        );

        Ok(transaction)
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn close(&self) {
        self.db.close().await;
    }
}
