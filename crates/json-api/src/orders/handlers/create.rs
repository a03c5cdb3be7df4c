//! Place Order Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use huerto_app::domain::orders::{
    data::{NewOrder, NewOrderItem},
    records::OrderUuid,
};

use crate::{
    extensions::*,
    observability::{OrderOutcome, record_order_outcome},
    orders::errors::{into_status_error, outcome},
    state::State,
};

/// Order Line Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderItemRequest {
    /// Product identifier
    pub id: Uuid,

    /// Units wanted, must be positive
    pub quantity: i32,

    /// Unit price the consumer saw
    #[salvo(schema(value_type = String))]
    pub price: Decimal,
}

/// Place Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceOrderRequest {
    pub consumer_id: Uuid,

    pub items: Vec<OrderItemRequest>,

    /// Client computed total, must equal the sum of `price × quantity`
    #[salvo(schema(value_type = String))]
    pub total: Decimal,
}

impl From<PlaceOrderRequest> for NewOrder {
    fn from(request: PlaceOrderRequest) -> Self {
        NewOrder {
            uuid: OrderUuid::new(),
            consumer_uuid: request.consumer_id.into(),
            items: request
                .items
                .into_iter()
                .map(|item| NewOrderItem {
                    product_uuid: item.id.into(),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            total: request.total,
        }
    }
}

/// Order Placed Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderPlacedResponse {
    /// New order identifier
    pub id: Uuid,
}

/// Place Order Handler
///
/// Creates the order, its line items and the stock decrements in one
/// transaction.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid order"),
        (status_code = StatusCode::NOT_FOUND, description = "Consumer or product not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock, stale price or concurrent update"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(
        consumer_uuid = tracing::field::Empty,
        items_count = tracing::field::Empty,
        total = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderPlacedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("consumer_uuid", tracing::field::display(request.consumer_id));
    span.record("items_count", request.items.len());
    span.record("total", tracing::field::display(request.total));

    let order = match state.app.orders.place_order(request.into()).await {
        Ok(order) => order,
        Err(error) => {
            record_order_outcome(outcome(&error));

            return Err(into_status_error(error));
        }
    };

    record_order_outcome(OrderOutcome::Placed);

    res.add_header(LOCATION, format!("/orders/{order}"), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(OrderPlacedResponse { id: order.into() }))
}
