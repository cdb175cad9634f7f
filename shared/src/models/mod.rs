//! Domain models for the Stockroom inventory service

mod product;
mod supplier;
mod transaction;

pub use product::*;
pub use supplier::*;
pub use transaction::*;
