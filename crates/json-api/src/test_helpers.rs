//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use huerto_app::{
    context::AppContext,
    domain::{
        orders::MockOrdersService, products::MockProductsService, users::MockUsersService,
        users::records::UserUuid,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_uuid(TEST_USER_UUID);
    ctrl.call_next(req, depot, res).await;
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_delete_product().never();

    products
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_place_order().never();
    orders.expect_list_orders().never();

    orders
}

fn strict_users_mock() -> MockUsersService {
    let mut users = MockUsersService::new();

    users.expect_create_user().never();
    users.expect_get_user().never();
    users.expect_get_producer_profile().never();

    users
}

fn state(
    products: MockProductsService,
    orders: MockOrdersService,
    users: MockUsersService,
) -> Arc<State> {
    State::from_app_context(AppContext {
        products: Arc::new(products),
        orders: Arc::new(orders),
        users: Arc::new(users),
    })
}

fn service(state: Arc<State>, route: Router, identified: bool) -> Service {
    let router = Router::new().hoop(inject(state));

    let router = if identified {
        router.hoop(inject_user)
    } else {
        router
    };

    Service::new(router.push(route))
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    service(
        state(products, strict_orders_mock(), strict_users_mock()),
        route,
        true,
    )
}

/// Like [`products_service`] but without an acting user in the depot.
pub(crate) fn anonymous_products_service(products: MockProductsService, route: Router) -> Service {
    service(
        state(products, strict_orders_mock(), strict_users_mock()),
        route,
        false,
    )
}

pub(crate) fn orders_service(orders: MockOrdersService, route: Router) -> Service {
    service(
        state(strict_products_mock(), orders, strict_users_mock()),
        route,
        true,
    )
}

pub(crate) fn users_service(users: MockUsersService, route: Router) -> Service {
    service(
        state(strict_products_mock(), strict_orders_mock(), users),
        route,
        true,
    )
}
