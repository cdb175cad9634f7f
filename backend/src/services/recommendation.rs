//! Reorder recommendation service

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::recommendation::{analysis_window_start, reorder_report};

use crate::error::AppResult;
use crate::store::{InventoryStore, ProductRepository, TransactionRepository};

/// Recommendation service
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn InventoryStore>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Build the reorder report from current stock and the last month of sales
    pub async fn reorder_suggestion(&self, now: DateTime<Utc>) -> AppResult<String> {
        let products = self.store.list_products(None).await?;
        let sales = self.store.sales_since(analysis_window_start(now)).await?;

        tracing::debug!(
            products = products.len(),
            sales = sales.len(),
            "Generating reorder recommendation"
        );

        Ok(reorder_report(&products, &sales, now)?)
    }
}
