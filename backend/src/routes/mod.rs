//! Route definitions for the Stockroom inventory service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/transactions", transaction_routes())
        .nest("/reports", report_routes())
        .nest("/recommendation", recommendation_routes())
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

fn transaction_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_transactions).post(handlers::create_transaction),
    )
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(handlers::low_stock))
        .route("/inventory-value", get(handlers::inventory_value))
        .route(
            "/products-by-supplier/:id",
            get(handlers::products_by_supplier),
        )
}

fn recommendation_routes() -> Router<AppState> {
    Router::new().route("/reorder", post(handlers::reorder_recommendation))
}
