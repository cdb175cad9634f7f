//! Transaction posting and history service

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{LineItem, NewTransaction, ProductRef, Transaction, TxType};
use uuid::Uuid;

use crate::error::AppResult;
use crate::store::{InventoryStore, ProductRepository, TransactionRepository};

/// A line item annotated with the product it refers to, if it still exists
#[derive(Debug, Clone, Serialize)]
pub struct TransactionItemView {
    #[serde(flatten)]
    pub item: LineItem,
    pub product: Option<ProductRef>,
}

/// A transaction as listed to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: Uuid,
    pub tx_type: TxType,
    pub tx_date: DateTime<Utc>,
    pub items: Vec<TransactionItemView>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Transaction service
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn InventoryStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// All transactions, newest first, with product summaries attached
    pub async fn list_transactions(&self) -> AppResult<Vec<TransactionView>> {
        let transactions = self.store.list_transactions().await?;

        let mut ids: Vec<Uuid> = transactions
            .iter()
            .flat_map(|tx| tx.items.iter().map(|item| item.product_id))
            .collect();
        ids.sort();
        ids.dedup();

        let products: HashMap<Uuid, ProductRef> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .get_products(&ids)
                .await?
                .iter()
                .map(|p| (p.id, p.summary()))
                .collect()
        };

        Ok(transactions
            .into_iter()
            .map(|tx| TransactionView {
                id: tx.id,
                tx_type: tx.tx_type,
                tx_date: tx.tx_date,
                items: tx
                    .items
                    .into_iter()
                    .map(|item| TransactionItemView {
                        product: products.get(&item.product_id).cloned(),
                        item,
                    })
                    .collect(),
                note: tx.note,
                created_at: tx.created_at,
            })
            .collect())
    }

    /// Validate and post a transaction. Either every line is applied or none.
    pub async fn record_transaction(&self, input: NewTransaction) -> AppResult<Transaction> {
        let request = input.validate()?;
        let tx_type = request.tx_type;
        let lines = request.items.len();

        let transaction = self.store.post_transaction(request).await.map_err(|e| {
            tracing::warn!(tx_type = %tx_type, lines, "Transaction rejected: {}", e);
            e
        })?;

        tracing::info!(
            transaction_id = %transaction.id,
            tx_type = %transaction.tx_type,
            lines,
            "Transaction recorded"
        );

        Ok(transaction)
    }
}
