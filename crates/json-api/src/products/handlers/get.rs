//! Get Product Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use huerto_app::domain::products::records::{CatalogProduct, ProductRecord};

use crate::{extensions::*, products::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub id: Uuid,

    /// The producer who owns the product
    pub producer_id: Uuid,

    pub name: String,

    pub description: String,

    /// Unit price, two decimal places
    #[salvo(schema(value_type = String))]
    pub price: Decimal,

    /// Unit the price applies to, e.g. `kg`
    pub unit: String,

    /// Units available to order
    pub stock: u32,

    pub category: String,

    pub image_url: Option<String>,

    /// Inactive products are hidden from the catalog and cannot be ordered
    pub active: bool,

    /// Producer display name, present on catalog reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_name: Option<String>,

    /// Producer location, present on catalog reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer_location: Option<String>,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        ProductResponse {
            id: product.uuid.into(),
            producer_id: product.producer_uuid.into(),
            name: product.name,
            description: product.description,
            price: product.price,
            unit: product.unit,
            stock: product.stock,
            category: product.category,
            image_url: product.image_url,
            active: product.active,
            producer_name: None,
            producer_location: None,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

impl From<CatalogProduct> for ProductResponse {
    fn from(listing: CatalogProduct) -> Self {
        ProductResponse {
            producer_name: Some(listing.producer_name),
            producer_location: listing.producer_location,
            ..ProductResponse::from(listing.product)
        }
    }
}

/// Get Product Handler
///
/// Returns a product with its producer's display fields.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .get_product(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}
