//! Orders service errors.

use rust_decimal::Decimal;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{orders::data::OrderValidationError, products::records::ProductUuid};

/// Serialization failure raised under concurrent modification.
const SERIALIZATION_FAILURE: &str = "40001";

/// Deadlock detected.
const DEADLOCK_DETECTED: &str = "40P01";

/// The kind of record an order referenced that could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReference {
    Consumer,
    Product(ProductUuid),
    /// A foreign key failed without telling us which row.
    Unknown,
}

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("invalid order")]
    Validation(#[from] OrderValidationError),

    #[error("referenced record not found: {0:?}")]
    NotFound(MissingReference),

    #[error("insufficient stock for product {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductUuid,
        requested: u64,
        available: u32,
    },

    #[error("price for product {product} changed from {submitted} to {current}")]
    PriceChanged {
        product: ProductUuid,
        submitted: Decimal,
        current: Decimal,
    },

    #[error("order conflicted with a concurrent update")]
    Conflict,

    #[error("storage unavailable")]
    Unavailable(#[source] Error),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(
            error,
            Error::PoolTimedOut | Error::PoolClosed | Error::Io(_) | Error::WorkerCrashed
        ) {
            return Self::Unavailable(error);
        }

        if is_concurrency_failure(&error) {
            return Self::Conflict;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound(MissingReference::Unknown),
            Some(ErrorKind::CheckViolation) => Self::Conflict,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

fn is_concurrency_failure(error: &Error) -> bool {
    error
        .as_database_error()
        .and_then(DatabaseError::code)
        .is_some_and(|code| matches!(code.as_ref(), SERIALIZATION_FAILURE | DEADLOCK_DETECTED))
}
