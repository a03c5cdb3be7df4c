//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use huerto_app::domain::products::data::ProductUpdate;

use crate::{
    extensions::*,
    products::{create::ProductRequest, errors::into_status_error, get::ProductResponse},
    state::State,
};

/// Product Update Handler
///
/// Replaces every editable field of a product owned by the acting producer.
#[endpoint(
    tags("products"),
    summary = "Update Product",
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing x-user-id header"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        price = tracing::field::Empty,
        stock = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<ProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let producer = depot.user_uuid_or_401()?;
    let request = json.into_inner();
    let product = product.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(producer));
    span.record("product_uuid", tracing::field::display(product));
    span.record("price", tracing::field::display(request.price));
    span.record("stock", request.stock);

    let updated = state
        .app
        .products
        .update_product(
            producer,
            product.into(),
            ProductUpdate {
                details: request.into(),
            },
        )
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, stock = updated.stock, "updated product");

    Ok(Json(updated.into()))
}
