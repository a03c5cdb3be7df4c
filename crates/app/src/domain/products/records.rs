//! Product Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub producer_uuid: UserUuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub unit: String,
    pub stock: u32,
    pub category: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Catalog Product
///
/// A product joined with the display fields of its producer.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    pub product: ProductRecord,
    pub producer_name: String,
    pub producer_location: Option<String>,
}
