//! Create Product Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use huerto_app::domain::products::{
    data::{NewProduct, ProductDetails},
    records::ProductUuid,
};

use crate::{extensions::*, products::errors::into_status_error, state::State};

const fn default_active() -> bool {
    true
}

/// Product Request
///
/// Every editable product field. Used for creation and for full replacement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductRequest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Unit price; a decimal string or number with at most two decimals
    #[salvo(schema(value_type = String))]
    pub price: Decimal,

    pub unit: String,

    pub stock: u32,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,
}

impl From<ProductRequest> for ProductDetails {
    fn from(request: ProductRequest) -> Self {
        ProductDetails {
            name: request.name,
            description: request.description,
            price: request.price,
            unit: request.unit,
            stock: request.stock,
            category: request.category,
            image_url: request.image_url,
            active: request.active,
        }
    }
}

/// Product Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductCreatedResponse {
    /// Created product identifier
    pub id: Uuid,
}

/// Create Product Handler
///
/// Creates a product owned by the producer named in `x-user-id`.
#[endpoint(
    tags("products"),
    summary = "Create Product",
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing x-user-id header"),
        (status_code = StatusCode::NOT_FOUND, description = "Producer not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let producer = depot.user_uuid_or_401()?;

    let uuid = state
        .app
        .products
        .create_product(
            producer,
            NewProduct {
                uuid: ProductUuid::new(),
                details: json.into_inner().into(),
            },
        )
        .await
        .map_err(into_status_error)?
        .uuid;

    res.add_header(LOCATION, format!("/products/{uuid}"), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(ProductCreatedResponse { id: uuid.into() }))
}
