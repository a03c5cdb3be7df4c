//! Orders Data

use rust_decimal::Decimal;
use smallvec::SmallVec;
use thiserror::Error;

use crate::domain::{
    orders::records::OrderUuid,
    products::{
        data::{is_valid_price, max_amount},
        records::ProductUuid,
    },
    users::records::UserUuid,
};

/// Order line as submitted: a product, the quantity wanted and the unit price the
/// consumer saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_uuid: ProductUuid,
    pub quantity: i32,
    pub price: Decimal,
}

impl NewOrderItem {
    /// Line subtotal, `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub consumer_uuid: UserUuid,
    pub items: SmallVec<[NewOrderItem; 4]>,
    pub total: Decimal,
}

/// Why a submitted order was refused before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("order has no items")]
    EmptyCart,

    #[error("quantity for product {product} must be positive, got {quantity}")]
    NonPositiveQuantity { product: ProductUuid, quantity: i32 },

    #[error("price for product {product} must be non-negative with at most two decimals")]
    InvalidPrice { product: ProductUuid },

    #[error("submitted total {submitted} does not match line items ({computed})")]
    TotalMismatch {
        submitted: Decimal,
        computed: Decimal,
    },

    #[error("order total overflows")]
    Overflow,
}

impl NewOrder {
    /// Sum of `price × quantity` over all lines.
    ///
    /// # Errors
    ///
    /// Returns [`OrderValidationError::Overflow`] when the sum does not fit.
    pub fn computed_total(&self) -> Result<Decimal, OrderValidationError> {
        self.items.iter().try_fold(Decimal::ZERO, |total, item| {
            item.subtotal()
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or(OrderValidationError::Overflow)
        })
    }

    /// Check the shape of the order: at least one line, positive quantities,
    /// well-formed prices and a total that matches the lines and fits the
    /// stored `NUMERIC(12,2)`.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.items.is_empty() {
            return Err(OrderValidationError::EmptyCart);
        }

        for item in &self.items {
            if item.quantity <= 0 {
                return Err(OrderValidationError::NonPositiveQuantity {
                    product: item.product_uuid,
                    quantity: item.quantity,
                });
            }

            if !is_valid_price(item.price) {
                return Err(OrderValidationError::InvalidPrice {
                    product: item.product_uuid,
                });
            }
        }

        let computed = self.computed_total()?;

        if computed > max_amount() {
            return Err(OrderValidationError::Overflow);
        }

        if computed != self.total {
            return Err(OrderValidationError::TotalMismatch {
                submitted: self.total,
                computed,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use smallvec::smallvec;

    use super::*;

    fn price(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap_or_default()
    }

    fn order(items: SmallVec<[NewOrderItem; 4]>, total: &str) -> NewOrder {
        NewOrder {
            uuid: OrderUuid::new(),
            consumer_uuid: UserUuid::new(),
            items,
            total: price(total),
        }
    }

    fn item(quantity: i32, unit_price: &str) -> NewOrderItem {
        NewOrderItem {
            product_uuid: ProductUuid::new(),
            quantity,
            price: price(unit_price),
        }
    }

    #[test]
    fn matching_total_is_valid() {
        let order = order(smallvec![item(2, "3.00"), item(1, "2.50")], "8.50");

        assert_eq!(order.validate(), Ok(()));
    }

    #[test]
    fn total_comparison_ignores_trailing_zeros() {
        let order = order(smallvec![item(2, "3")], "6.00");

        assert_eq!(order.validate(), Ok(()));
    }

    #[test]
    fn empty_order_is_rejected() {
        let order = order(SmallVec::new(), "0");

        assert_eq!(order.validate(), Err(OrderValidationError::EmptyCart));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let line = item(0, "3.00");
        let order = order(smallvec![line], "0");

        assert_eq!(
            order.validate(),
            Err(OrderValidationError::NonPositiveQuantity {
                product: line.product_uuid,
                quantity: 0,
            })
        );
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let order = order(smallvec![item(-3, "3.00")], "-9.00");

        assert!(matches!(
            order.validate(),
            Err(OrderValidationError::NonPositiveQuantity { quantity: -3, .. })
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let order = order(smallvec![item(1, "-1.00")], "-1.00");

        assert!(matches!(
            order.validate(),
            Err(OrderValidationError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn mismatched_total_is_rejected() {
        let order = order(smallvec![item(2, "3.00")], "5.00");

        assert_eq!(
            order.validate(),
            Err(OrderValidationError::TotalMismatch {
                submitted: price("5.00"),
                computed: price("6.00"),
            })
        );
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let order = order(smallvec![item(i32::MAX, "9999999999.99")], "0");

        assert_eq!(order.validate(), Err(OrderValidationError::Overflow));
    }

    #[test]
    fn total_at_column_limit_is_valid() {
        let order = order(
            smallvec![item(1, "9999999999.00"), item(1, "0.99")],
            "9999999999.99",
        );

        assert_eq!(order.validate(), Ok(()));
    }

    #[test]
    fn total_past_column_limit_is_rejected() {
        let order = order(smallvec![item(2, "9999999999.99")], "19999999999.98");

        assert_eq!(order.validate(), Err(OrderValidationError::Overflow));
    }

    #[test]
    fn checked_sum_overflow_is_reported() {
        let order = order(
            smallvec![item(1, "0.01"), NewOrderItem {
                product_uuid: ProductUuid::new(),
                quantity: i32::MAX,
                price: Decimal::MAX,
            }],
            "0",
        );

        assert_eq!(order.computed_total(), Err(OrderValidationError::Overflow));
    }
}
