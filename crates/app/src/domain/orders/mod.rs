//! Orders
//!
//! Order placement turns a submitted cart into an order, its line items and the
//! matching stock decrements inside one transaction.

pub mod data;
pub mod errors;
pub mod records;
mod repositories;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;
