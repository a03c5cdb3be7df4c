//! Cart errors.

use std::num::TryFromIntError;

use thiserror::Error;

use crate::domain::products::records::ProductUuid;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("cart is empty")]
    Empty,

    #[error("product {0} is out of stock")]
    OutOfStock(ProductUuid),

    #[error("product {0} is not available")]
    Unavailable(ProductUuid),

    #[error("product {0} is not in the cart")]
    NotInCart(ProductUuid),

    #[error("quantity does not fit an order line")]
    QuantityTooLarge(#[from] TryFromIntError),
}
