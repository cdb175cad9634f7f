//! In-memory store (for development/testing)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    stage_posting, PostingRequest, Product, ProductUpdate, Supplier, Transaction, TxType,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    InventoryStore, ProductRepository, SupplierRepository, TransactionRepository, DUPLICATE_EMAIL,
    DUPLICATE_SKU,
};
use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct MemoryState {
    /// Insertion order
    products: Vec<Product>,
    suppliers: Vec<Supplier>,
    /// Append order, oldest first
    transactions: Vec<Transaction>,
}

/// Store kept in process memory behind a single lock.
///
/// A posting holds the write lock from the first product lookup until the
/// record is appended, so concurrent postings cannot interleave.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn list_products(&self, search: Option<&str>) -> AppResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .filter(|p| search.map_or(true, |term| p.matches_search(term)))
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn get_products(&self, ids: &[Uuid]) -> AppResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn sku_exists(&self, sku: &str) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.products.iter().any(|p| p.sku == sku))
    }

    async fn insert_product(&self, product: &Product) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.products.iter().any(|p| p.sku == product.sku) {
            return Err(AppError::Conflict(DUPLICATE_SKU.to_string()));
        }
        state.products.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> AppResult<Option<Product>> {
        let mut state = self.state.write().await;
        let Some(existing) = state.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let mut product = existing.clone();
        update.apply(&mut product, Utc::now())?;
        *existing = product.clone();

        Ok(Some(product))
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        Ok(state.products.len() != before)
    }

    async fn low_stock_products(&self) -> AppResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(shared::reporting::low_stock(&state.products))
    }

    async fn products_by_supplier(&self, supplier_id: Uuid) -> AppResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(shared::reporting::supplied_by(&state.products, supplier_id))
    }
}

#[async_trait]
impl SupplierRepository for MemoryStore {
    async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        Ok(self.state.read().await.suppliers.clone())
    }

    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        let state = self.state.read().await;
        Ok(state.suppliers.iter().find(|s| s.id == id).cloned())
    }

    async fn get_suppliers(&self, ids: &[Uuid]) -> AppResult<Vec<Supplier>> {
        let state = self.state.read().await;
        Ok(state
            .suppliers
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.suppliers.iter().any(|s| s.email == supplier.email) {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        state.suppliers.push(supplier.clone());
        Ok(())
    }

    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state
            .suppliers
            .iter()
            .any(|s| s.id != supplier.id && s.email == supplier.email)
        {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
        }
        match state.suppliers.iter_mut().find(|s| s.id == supplier.id) {
            Some(existing) => {
                *existing = supplier.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.suppliers.len();
        state.suppliers.retain(|s| s.id != id);
        Ok(state.suppliers.len() != before)
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn list_transactions(&self) -> AppResult<Vec<Transaction>> {
        let state = self.state.read().await;
        Ok(state.transactions.iter().rev().cloned().collect())
    }

    async fn sales_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Transaction>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|tx| tx.tx_type == TxType::Sale && tx.tx_date >= since)
            .cloned()
            .collect())
    }

    async fn post_transaction(&self, request: PostingRequest) -> AppResult<Transaction> {
        let mut state = self.state.write().await;

        let staged = stage_posting(&request, |id| {
            state.products.iter().find(|p| p.id == id).cloned()
        })?;

        let now = Utc::now();
        for product in staged {
            if let Some(existing) = state.products.iter_mut().find(|p| p.id == product.id) {
                *existing = Product {
                    updated_at: now,
                    ..product
                };
            }
        }

        let transaction = request.into_transaction(Uuid::new_v4(), now);
        state.transactions.push(transaction.clone());

        Ok(transaction)
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::LineItem;

    fn product(sku: &str, stock_qty: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: format!("Product {}", sku),
            sku: sku.to_string(),
            unit: "pcs".to_string(),
            stock_qty,
            reorder_level: 5,
            avg_cost: Decimal::from(2),
            supplier_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(items: Vec<(Uuid, i32)>) -> PostingRequest {
        PostingRequest {
            tx_type: TxType::Sale,
            items: items
                .into_iter()
                .map(|(product_id, quantity)| LineItem {
                    product_id,
                    quantity,
                    unit_price: Decimal::ONE,
                })
                .collect(),
            note: None,
            tx_date: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_sku_conflicts() {
        let store = MemoryStore::new();
        store.insert_product(&product("A1", 1)).await.unwrap();

        let err = store.insert_product(&product("A1", 2)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.list_products(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_posting_rolls_back_earlier_lines() {
        let store = MemoryStore::new();
        let a = product("A1", 10);
        let b = product("B1", 1);
        store.insert_product(&a).await.unwrap();
        store.insert_product(&b).await.unwrap();

        let result = store.post_transaction(sale(vec![(a.id, 4), (b.id, 2)])).await;
        assert!(matches!(result, Err(AppError::InsufficientStock(_))));

        let a_after = store.get_product(a.id).await.unwrap().unwrap();
        assert_eq!(a_after.stock_qty, 10);
        assert!(store.list_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let store = MemoryStore::new();
        let p = product("A1", 10);
        store.insert_product(&p).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let id = p.id;
            handles.push(tokio::spawn(async move {
                store.post_transaction(sale(vec![(id, 3)])).await.is_ok()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 3);
        let after = store.get_product(p.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 1);
    }

    #[tokio::test]
    async fn test_update_keeps_stock_from_posting() {
        let store = MemoryStore::new();
        let p = product("A1", 10);
        store.insert_product(&p).await.unwrap();
        store.post_transaction(sale(vec![(p.id, 4)])).await.unwrap();

        let update = ProductUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = store.update_product(p.id, update).await.unwrap().unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.stock_qty, 6);
        assert_eq!(store.get_product(p.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_product() {
        let store = MemoryStore::new();
        let p = product("A1", 10);
        store.insert_product(&p).await.unwrap();

        let update = ProductUpdate {
            name: Some("Renamed".to_string()),
            stock_qty: Some(-1),
            ..Default::default()
        };
        let err = store.update_product(p.id, update).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(store.get_product(p.id).await.unwrap().unwrap().name, "Product A1");

        let missing = store
            .update_product(Uuid::new_v4(), ProductUpdate::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let store = MemoryStore::new();
        let p = product("A1", 10);
        store.insert_product(&p).await.unwrap();

        let first = store.post_transaction(sale(vec![(p.id, 1)])).await.unwrap();
        let second = store.post_transaction(sale(vec![(p.id, 1)])).await.unwrap();

        let listed: Vec<Uuid> = store
            .list_transactions()
            .await
            .unwrap()
            .into_iter()
            .map(|tx| tx.id)
            .collect();
        assert_eq!(listed, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_supplier_email_unique_on_update() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let acme = Supplier {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            email: "a@acme.test".to_string(),
            phone: None,
            created_at: now,
            updated_at: now,
        };
        let mut globex = Supplier {
            id: Uuid::new_v4(),
            name: "Globex".to_string(),
            email: "g@globex.test".to_string(),
            ..acme.clone()
        };
        store.insert_supplier(&acme).await.unwrap();
        store.insert_supplier(&globex).await.unwrap();

        globex.email = acme.email.clone();
        let err = store.update_supplier(&globex).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
