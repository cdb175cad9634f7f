//! Shared types and domain logic for the Stockroom inventory service
//!
//! This crate contains the models and the pure calculations (stock posting,
//! reporting, reorder recommendations) shared between the backend and the
//! client-side WASM module. Nothing in here performs I/O.

pub mod models;
pub mod posting;
pub mod recommendation;
pub mod reporting;
pub mod validation;

pub use models::*;
pub use posting::*;
pub use validation::*;
