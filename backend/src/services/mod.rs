//! Business logic services for the Stockroom inventory service
//!
//! Services are cheap to build and are created per request from the shared
//! store handle.

pub mod product;
pub mod recommendation;
pub mod reporting;
pub mod supplier;
pub mod transaction;

pub use product::{ProductService, ProductWithSuppliers};
pub use recommendation::RecommendationService;
pub use reporting::ReportingService;
pub use supplier::SupplierService;
pub use transaction::{TransactionItemView, TransactionService, TransactionView};
