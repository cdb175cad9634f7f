//! HTTP handlers for product endpoints

use axum::extract::{Query, State};
use serde::Deserialize;
use shared::{NewProduct, Product, ProductUpdate};

use crate::error::AppResult;
use crate::extractors::{ApiJson, IdPath};
use crate::response::ApiResponse;
use crate::services::{ProductService, ProductWithSuppliers};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
}

/// List products, optionally filtered by `?search=`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<ApiResponse<Vec<ProductWithSuppliers>>> {
    let service = ProductService::new(state.store);
    let products = service.list_products(query.search.as_deref()).await?;
    Ok(ApiResponse::ok(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<ProductWithSuppliers>> {
    let service = ProductService::new(state.store);
    Ok(ApiResponse::ok(service.get_product(id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewProduct>,
) -> AppResult<ApiResponse<Product>> {
    let service = ProductService::new(state.store);
    let product = service.create_product(input).await?;
    Ok(ApiResponse::created("Product created successfully", product))
}

pub async fn update_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<ProductUpdate>,
) -> AppResult<ApiResponse<Product>> {
    let service = ProductService::new(state.store);
    let product = service.update_product(id, input).await?;
    Ok(ApiResponse::ok(product).with_message("Product updated successfully"))
}

pub async fn delete_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    let service = ProductService::new(state.store);
    service.delete_product(id).await?;
    Ok(ApiResponse::message("Product deleted successfully"))
}
