//! Consumer Orders Handler

use std::sync::Arc;

use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use huerto_app::domain::orders::records::{OrderItemRecord, OrderRecord};

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Order Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub id: Uuid,

    /// Absent once the product has been deleted
    pub product_id: Option<Uuid>,

    /// Absent once the product has been deleted
    pub product_name: Option<String>,

    pub quantity: u32,

    /// Unit price captured when the order was placed
    #[salvo(schema(value_type = String))]
    pub price: Decimal,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        OrderItemResponse {
            id: item.uuid.into(),
            product_id: item.product_uuid.map(Into::into),
            product_name: item.product_name,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub id: Uuid,

    pub consumer_id: Uuid,

    #[salvo(schema(value_type = String))]
    pub total: Decimal,

    /// One of `pending`, `confirmed`, `fulfilled` or `cancelled`
    pub status: String,

    pub created_at: String,

    pub items: Vec<OrderItemResponse>,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            id: order.uuid.into(),
            consumer_id: order.consumer_uuid.into(),
            total: order.total,
            status: order.status.to_string(),
            created_at: order.created_at.to_string(),
            items: order.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    /// Newest first
    pub orders: Vec<OrderResponse>,
}

/// Consumer Orders Handler
///
/// Returns a consumer's orders with their line items. Unknown consumers have no
/// orders.
#[endpoint(
    tags("orders"),
    summary = "List Consumer Orders",
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Storage unavailable"),
    ),
)]
pub(crate) async fn handler(
    consumer: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let orders = state
        .app
        .orders
        .list_orders(consumer.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}
