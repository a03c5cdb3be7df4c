//! Carts
//!
//! A consumer's cart lives in memory until it is checked out into an order.

mod cart;
pub mod errors;

pub use cart::*;
pub use errors::CartError;
