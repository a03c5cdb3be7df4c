//! Cart
//!
//! Client-side basket held in memory until checkout turns it into a [`NewOrder`].

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::domain::{
    carts::errors::CartError,
    orders::{
        data::{NewOrder, NewOrderItem},
        records::OrderUuid,
    },
    products::records::{ProductRecord, ProductUuid},
    users::records::UserUuid,
};

/// The parts of a product a cart line needs, as seen when it was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub unit: String,
    pub price: Decimal,
    pub stock: u32,
}

impl From<&ProductRecord> for CartProduct {
    fn from(product: &ProductRecord) -> Self {
        Self {
            uuid: product.uuid,
            name: product.name.clone(),
            unit: product.unit.clone(),
            price: product.price,
            stock: product.stock,
        }
    }
}

/// Cart Line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart
///
/// Lines keep the order products were first added in. Quantities stay within
/// `1..=stock` of the product snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn quantity_of(&self, product: ProductUuid) -> Option<u32> {
        self.line(product).map(|line| line.quantity)
    }

    /// Add one unit of `product`, starting a new line if needed.
    ///
    /// A line already at the product's stock stays where it is. Returns the
    /// line's quantity afterwards.
    ///
    /// # Errors
    ///
    /// Inactive products are [`CartError::Unavailable`]; products with no stock
    /// are [`CartError::OutOfStock`].
    pub fn add(&mut self, product: &ProductRecord) -> Result<u32, CartError> {
        if !product.active {
            return Err(CartError::Unavailable(product.uuid));
        }

        if product.stock == 0 {
            return Err(CartError::OutOfStock(product.uuid));
        }

        if let Some(line) = self.line_mut(product.uuid) {
            line.product = CartProduct::from(product);
            line.quantity = line.quantity.saturating_add(1).min(product.stock);

            return Ok(line.quantity);
        }

        self.lines.push(CartLine {
            product: CartProduct::from(product),
            quantity: 1,
        });

        Ok(1)
    }

    /// Change a line's quantity by `delta`, clamped to `[1, stock]`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] when there is no line for `product`.
    pub fn adjust(&mut self, product: ProductUuid, delta: i64) -> Result<u32, CartError> {
        let line = self
            .line_mut(product)
            .ok_or(CartError::NotInCart(product))?;

        let wanted = i64::from(line.quantity).saturating_add(delta);
        let clamped = wanted.clamp(1, i64::from(line.product.stock.max(1)));

        line.quantity = u32::try_from(clamped)?;

        Ok(line.quantity)
    }

    /// Drop the line for `product`. Returns whether a line was removed.
    pub fn remove(&mut self, product: ProductUuid) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.product.uuid != product);

        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Build the order submission for this cart.
    ///
    /// The cart itself is left untouched so it survives a failed order; call
    /// [`Cart::clear`] once the order has been placed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] for an empty cart.
    pub fn checkout(&self, consumer: UserUuid) -> Result<NewOrder, CartError> {
        if self.lines.is_empty() {
            return Err(CartError::Empty);
        }

        let items = self
            .lines
            .iter()
            .map(|line| {
                Ok(NewOrderItem {
                    product_uuid: line.product.uuid,
                    quantity: i32::try_from(line.quantity)?,
                    price: line.product.price,
                })
            })
            .collect::<Result<SmallVec<[NewOrderItem; 4]>, CartError>>()?;

        Ok(NewOrder {
            uuid: OrderUuid::new(),
            consumer_uuid: consumer,
            items,
            total: self.total(),
        })
    }

    fn line(&self, product: ProductUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.uuid == product)
    }

    fn line_mut(&mut self, product: ProductUuid) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.uuid == product)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::Timestamp;

    use super::*;

    fn product(price: &str, stock: u32) -> ProductRecord {
        ProductRecord {
            uuid: ProductUuid::new(),
            producer_uuid: UserUuid::new(),
            name: "Tomates Cherry".to_string(),
            description: String::new(),
            price: Decimal::from_str(price).unwrap_or_default(),
            unit: "kg".to_string(),
            stock,
            category: "Verduras".to_string(),
            image_url: None,
            active: true,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn decimal(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap_or_default()
    }

    #[test]
    fn adding_a_product_twice_increments_its_line() -> Result<(), CartError> {
        let tomatoes = product("3.00", 20);
        let mut cart = Cart::new();

        assert_eq!(cart.add(&tomatoes)?, 1);
        assert_eq!(cart.add(&tomatoes)?, 2);
        assert_eq!(cart.lines().len(), 1);

        Ok(())
    }

    #[test]
    fn adding_never_exceeds_stock() -> Result<(), CartError> {
        let honey = product("7.45", 2);
        let mut cart = Cart::new();

        cart.add(&honey)?;
        cart.add(&honey)?;

        assert_eq!(cart.add(&honey)?, 2);

        Ok(())
    }

    #[test]
    fn out_of_stock_and_inactive_products_cannot_be_added() {
        let sold_out = product("1.00", 0);
        let mut hidden = product("1.00", 5);
        hidden.active = false;

        let mut cart = Cart::new();

        assert!(matches!(cart.add(&sold_out), Err(CartError::OutOfStock(_))));
        assert!(matches!(cart.add(&hidden), Err(CartError::Unavailable(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn adjust_clamps_between_one_and_stock() -> Result<(), CartError> {
        let eggs = product("0.35", 12);
        let mut cart = Cart::new();

        cart.add(&eggs)?;

        assert_eq!(cart.adjust(eggs.uuid, 5)?, 6);
        assert_eq!(cart.adjust(eggs.uuid, 100)?, 12);
        assert_eq!(cart.adjust(eggs.uuid, -50)?, 1);
        assert_eq!(cart.adjust(eggs.uuid, i64::MIN)?, 1);

        Ok(())
    }

    #[test]
    fn adjust_unknown_product_is_not_in_cart() {
        let mut cart = Cart::new();

        let result = cart.adjust(ProductUuid::new(), 1);

        assert!(matches!(result, Err(CartError::NotInCart(_))));
    }

    #[test]
    fn remove_drops_only_the_matching_line() -> Result<(), CartError> {
        let tomatoes = product("3.00", 20);
        let honey = product("7.45", 5);
        let mut cart = Cart::new();

        cart.add(&tomatoes)?;
        cart.add(&honey)?;

        assert!(cart.remove(tomatoes.uuid));
        assert!(!cart.remove(tomatoes.uuid));
        assert_eq!(cart.quantity_of(honey.uuid), Some(1));
        assert_eq!(cart.quantity_of(tomatoes.uuid), None);

        Ok(())
    }

    #[test]
    fn total_sums_price_times_quantity() -> Result<(), CartError> {
        let tomatoes = product("3.00", 20);
        let honey = product("7.45", 5);
        let mut cart = Cart::new();

        cart.add(&tomatoes)?;
        cart.adjust(tomatoes.uuid, 1)?;
        cart.add(&honey)?;

        assert_eq!(cart.total(), decimal("13.45"));

        Ok(())
    }

    #[test]
    fn checkout_builds_a_valid_order_and_keeps_the_cart() -> Result<(), CartError> {
        let tomatoes = product("3.00", 20);
        let consumer = UserUuid::new();
        let mut cart = Cart::new();

        cart.add(&tomatoes)?;
        cart.adjust(tomatoes.uuid, 1)?;

        let order = cart.checkout(consumer)?;

        assert_eq!(order.consumer_uuid, consumer);
        assert_eq!(order.total, decimal("6.00"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.validate(), Ok(()));
        assert_eq!(cart.quantity_of(tomatoes.uuid), Some(2));

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let cart = Cart::new();

        assert!(matches!(cart.checkout(UserUuid::new()), Err(CartError::Empty)));
    }
}
