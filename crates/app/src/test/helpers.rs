//! Test Helpers

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{
    domain::{
        orders::{
            data::{NewOrder, NewOrderItem},
            records::OrderUuid,
        },
        products::{
            ProductsService, ProductsServiceError,
            data::{NewProduct, ProductDetails},
            records::{ProductRecord, ProductUuid},
        },
        users::{
            data::NewUser,
            records::{UserRole, UserUuid},
        },
    },
    test::TestContext,
};

pub(crate) fn price(value: &str) -> Decimal {
    Decimal::from_str(value).expect("test prices should parse")
}

pub(crate) fn new_user(name: &str, role: UserRole) -> NewUser {
    let uuid = UserUuid::new();

    NewUser {
        uuid,
        name: name.to_string(),
        email: format!("{uuid}@example.test"),
        role,
        location: None,
        description: None,
        image_url: None,
    }
}

pub(crate) fn product_details(price: Decimal, stock: u32) -> ProductDetails {
    ProductDetails {
        name: "Tomates Cherry".to_string(),
        description: "Recién cosechados.".to_string(),
        price,
        unit: "kg".to_string(),
        stock,
        category: "Verduras".to_string(),
        image_url: None,
        active: true,
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    producer: UserUuid,
    unit_price: &str,
    stock: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(
            producer,
            NewProduct {
                uuid: ProductUuid::new(),
                details: product_details(price(unit_price), stock),
            },
        )
        .await
}

/// An order for `lines` at the products' current prices, with a matching total.
pub(crate) fn new_order(consumer: UserUuid, lines: &[(&ProductRecord, i32)]) -> NewOrder {
    let items = lines
        .iter()
        .map(|(product, quantity)| NewOrderItem {
            product_uuid: product.uuid,
            quantity: *quantity,
            price: product.price,
        })
        .collect();

    let total = lines
        .iter()
        .map(|(product, quantity)| product.price * Decimal::from(*quantity))
        .sum();

    NewOrder {
        uuid: OrderUuid::new(),
        consumer_uuid: consumer,
        items,
        total,
    }
}
