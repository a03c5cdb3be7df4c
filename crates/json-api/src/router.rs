//! App Router

use salvo::Router;

use crate::{healthcheck, identity, orders, producers, products};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::new()
                .hoop(identity::handler)
                .push(
                    Router::with_path("products")
                        .get(products::index::handler)
                        .post(products::create::handler)
                        .push(
                            Router::with_path("{product}")
                                .get(products::get::handler)
                                .put(products::update::handler)
                                .delete(products::delete::handler),
                        ),
                )
                .push(Router::with_path("producers/{producer}").get(producers::get::handler))
                .push(
                    Router::with_path("orders")
                        .post(orders::create::handler)
                        .push(Router::with_path("{consumer}").get(orders::index::handler)),
                ),
        )
}
