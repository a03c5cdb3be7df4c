//! Order Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use huerto_app::domain::orders::{OrdersServiceError, errors::MissingReference};

use crate::observability::OrderOutcome;

/// The metrics outcome a failed placement is counted under.
pub(crate) fn outcome(error: &OrdersServiceError) -> OrderOutcome {
    match error {
        OrdersServiceError::Validation(_) => OrderOutcome::Invalid,
        OrdersServiceError::NotFound(_) => OrderOutcome::NotFound,
        OrdersServiceError::InsufficientStock { .. } => OrderOutcome::InsufficientStock,
        OrdersServiceError::PriceChanged { .. } => OrderOutcome::PriceChanged,
        OrdersServiceError::Conflict => OrderOutcome::Conflict,
        OrdersServiceError::Unavailable(_) => OrderOutcome::Unavailable,
        OrdersServiceError::Sql(_) => OrderOutcome::Failed,
    }
}

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::Validation(reason) => StatusError::bad_request()
            .brief("Invalid order")
            .detail(reason.to_string()),
        OrdersServiceError::NotFound(missing) => {
            let brief = match missing {
                MissingReference::Consumer => "Consumer not found",
                MissingReference::Product(_) => "Product not found",
                MissingReference::Unknown => "Referenced record not found",
            };

            StatusError::not_found().brief(brief).detail(error.to_string())
        }
        OrdersServiceError::InsufficientStock { .. } => StatusError::conflict()
            .brief("Insufficient stock")
            .detail(error.to_string()),
        OrdersServiceError::PriceChanged { .. } => StatusError::conflict()
            .brief("Price changed")
            .detail(error.to_string()),
        OrdersServiceError::Conflict => StatusError::conflict()
            .brief("Order conflicted with a concurrent update, please retry"),
        OrdersServiceError::Unavailable(source) => {
            warn!("order storage unavailable: {source}");

            StatusError::service_unavailable().brief("Storage unavailable")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
