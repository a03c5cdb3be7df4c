//! Products

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ProductsServiceError;
pub(crate) use repository::{PgProductsRepository, StockDecrement};
pub use service::*;
