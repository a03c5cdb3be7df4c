//! Delete Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, products::errors::into_status_error, state::State};

/// Delete Product Handler
#[endpoint(
    tags("products"),
    summary = "Delete Product",
    responses(
        (status_code = StatusCode::OK, description = "Product deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing x-user-id header"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let producer = depot.user_uuid_or_401()?;
    let product = product.into_inner();

    state
        .app
        .products
        .delete_product(producer, product.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product, "deleted product");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;

    use huerto_app::domain::products::{
        MockProductsService, ProductsServiceError, records::ProductUuid,
    };

    use crate::test_helpers::{TEST_USER_UUID, anonymous_products_service, products_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}").delete(handler)
    }

    #[tokio::test]
    async fn test_delete_product_success() {
        let uuid = ProductUuid::new();

        let mut repo = MockProductsService::new();

        repo.expect_delete_product()
            .once()
            .withf(move |producer, p| *producer == TEST_USER_UUID && *p == uuid)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/products/{uuid}"))
            .send(&products_service(repo, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_delete_product_not_found_returns_404() {
        let uuid = ProductUuid::new();

        let mut repo = MockProductsService::new();

        repo.expect_delete_product()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/products/{uuid}"))
            .send(&products_service(repo, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_delete_product_without_identity_returns_401() {
        let uuid = ProductUuid::new();

        let mut repo = MockProductsService::new();

        repo.expect_delete_product().never();

        let res = TestClient::delete(format!("http://example.com/products/{uuid}"))
            .send(&anonymous_products_service(repo, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));
    }
}
