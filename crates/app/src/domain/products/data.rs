//! Products Data

use rust_decimal::Decimal;

use crate::domain::products::records::ProductUuid;

/// Prices are stored with two fractional digits.
pub const PRICE_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12,2)` column holds.
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, PRICE_SCALE)
}

/// Product fields supplied by a producer on create and on full replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub unit: String,
    pub stock: u32,
    pub category: String,
    pub image_url: Option<String>,
    pub active: bool,
}

impl ProductDetails {
    /// Whether the details describe a listable product: named, with a unit and a
    /// non-negative price of at most two decimal places.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.unit.trim().is_empty()
            && is_valid_price(self.price)
    }
}

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub details: ProductDetails,
}

/// Product Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub details: ProductDetails,
}

pub(crate) fn is_valid_price(price: Decimal) -> bool {
    !price.is_sign_negative()
        && price.normalize().scale() <= PRICE_SCALE
        && price <= max_amount()
}
