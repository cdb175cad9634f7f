//! Reporting handlers for stock reports and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::Product;

use crate::error::AppResult;
use crate::extractors::IdPath;
use crate::response::ApiResponse;
use crate::services::reporting::{LowStockCsvRow, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValue {
    pub total_value: Decimal,
}

/// Products at or below their reorder level
pub async fn low_stock(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store);
    let products = service.low_stock().await?;

    if query.format.as_deref() == Some("csv") {
        let rows: Vec<LowStockCsvRow> = products.iter().map(LowStockCsvRow::from).collect();
        let csv = ReportingService::export_to_csv(&rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"low_stock.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(ApiResponse::ok(products).into_response())
    }
}

/// Total stock value at average cost
pub async fn inventory_value(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<InventoryValue>> {
    let service = ReportingService::new(state.store);
    let total_value = service.inventory_value().await?;
    Ok(ApiResponse::ok(InventoryValue { total_value }))
}

pub async fn products_by_supplier(
    State(state): State<AppState>,
    IdPath(supplier_id): IdPath,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let service = ReportingService::new(state.store);
    Ok(ApiResponse::ok(service.products_by_supplier(supplier_id).await?))
}
