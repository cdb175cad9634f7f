//! HTTP handlers for supplier endpoints

use axum::extract::State;
use shared::{NewSupplier, Supplier, SupplierUpdate};

use crate::error::AppResult;
use crate::extractors::{ApiJson, IdPath};
use crate::response::ApiResponse;
use crate::services::SupplierService;
use crate::AppState;

pub async fn list_suppliers(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Supplier>>> {
    let service = SupplierService::new(state.store);
    Ok(ApiResponse::ok(service.list_suppliers().await?))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Supplier>> {
    let service = SupplierService::new(state.store);
    Ok(ApiResponse::ok(service.get_supplier(id).await?))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewSupplier>,
) -> AppResult<ApiResponse<Supplier>> {
    let service = SupplierService::new(state.store);
    let supplier = service.create_supplier(input).await?;
    Ok(ApiResponse::created("Supplier created successfully", supplier))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<SupplierUpdate>,
) -> AppResult<ApiResponse<Supplier>> {
    let service = SupplierService::new(state.store);
    let supplier = service.update_supplier(id, input).await?;
    Ok(ApiResponse::ok(supplier).with_message("Supplier updated successfully"))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    let service = SupplierService::new(state.store);
    service.delete_supplier(id).await?;
    Ok(ApiResponse::message("Supplier deleted successfully"))
}
