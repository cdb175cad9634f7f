//! HTTP handlers

pub mod health;
pub mod product;
pub mod recommendation;
pub mod reporting;
pub mod supplier;
pub mod transaction;

pub use health::{health_check, root};
pub use product::{create_product, delete_product, get_product, list_products, update_product};
pub use recommendation::reorder_recommendation;
pub use reporting::{inventory_value, low_stock, products_by_supplier};
pub use supplier::{create_supplier, delete_supplier, get_supplier, list_suppliers, update_supplier};
pub use transaction::{create_transaction, list_transactions};
