//! HTTP handlers for transaction endpoints

use axum::extract::State;
use shared::{NewTransaction, Transaction};

use crate::error::AppResult;
use crate::extractors::ApiJson;
use crate::response::ApiResponse;
use crate::services::{TransactionService, TransactionView};
use crate::AppState;

/// Transaction history, newest first
pub async fn list_transactions(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<TransactionView>>> {
    let service = TransactionService::new(state.store);
    Ok(ApiResponse::ok(service.list_transactions().await?))
}

/// Record a purchase or sale and apply it to stock
pub async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewTransaction>,
) -> AppResult<ApiResponse<Transaction>> {
    let service = TransactionService::new(state.store);
    let transaction = service.record_transaction(input).await?;
    Ok(ApiResponse::created("Transaction recorded", transaction))
}
