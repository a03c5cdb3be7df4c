//! Products service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        products::{
            data::{NewProduct, ProductDetails, ProductUpdate},
            errors::ProductsServiceError,
            records::{CatalogProduct, ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

fn validate(details: &ProductDetails) -> Result<(), ProductsServiceError> {
    if !details.is_valid() {
        return Err(ProductsServiceError::InvalidData);
    }

    i32::try_from(details.stock)?;

    Ok(())
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(&self) -> Result<Vec<CatalogProduct>, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let products = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<CatalogProduct, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        producer: UserUuid,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        validate(&product.details)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .repository
            .create_product(&mut tx, producer, product.uuid, product.details)
            .await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, producer_uuid = %producer, "created product");

        Ok(created)
    }

    async fn update_product(
        &self,
        producer: UserUuid,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        validate(&update.details)?;

        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .repository
            .update_product(&mut tx, producer, product, update.details)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(
        &self,
        producer: UserUuid,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self
            .repository
            .delete_product(&mut tx, producer, product)
            .await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(product_uuid = %product, producer_uuid = %producer, "deleted product");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves all active products with their producer's display fields.
    async fn list_products(&self) -> Result<Vec<CatalogProduct>, ProductsServiceError>;

    /// Retrieve a single product, active or not.
    async fn get_product(&self, product: ProductUuid)
    -> Result<CatalogProduct, ProductsServiceError>;

    /// Creates a new product owned by the given producer.
    async fn create_product(
        &self,
        producer: UserUuid,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Replaces every editable field of a product the producer owns.
    async fn update_product(
        &self,
        producer: UserUuid,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Hard-deletes a product the producer owns.
    async fn delete_product(
        &self,
        producer: UserUuid,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{
        TestContext,
        helpers::{create_product, price, product_details},
    };

    use super::*;

    #[tokio::test]
    async fn create_product_returns_submitted_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;
        let uuid = ProductUuid::new();

        let product = ctx
            .products
            .create_product(
                producer,
                NewProduct {
                    uuid,
                    details: product_details(price("12.50"), 50),
                },
            )
            .await?;

        assert_eq!(product.uuid, uuid);
        assert_eq!(product.producer_uuid, producer);
        assert_eq!(product.price, price("12.50"));
        assert_eq!(product.stock, 50);
        assert!(product.active);

        Ok(())
    }

    #[tokio::test]
    async fn create_product_for_consumer_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let consumer = ctx.create_consumer().await?;

        let result = ctx
            .products
            .create_product(
                consumer,
                NewProduct {
                    uuid: ProductUuid::new(),
                    details: product_details(price("3.00"), 20),
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound for a non-producer owner, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_product_for_unknown_producer_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .products
            .create_product(
                UserUuid::new(),
                NewProduct {
                    uuid: ProductUuid::new(),
                    details: product_details(price("3.00"), 20),
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_product_with_negative_price_returns_invalid_data() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;

        let result = ctx
            .products
            .create_product(
                producer,
                NewProduct {
                    uuid: ProductUuid::new(),
                    details: product_details(price("-1.00"), 20),
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_product_with_oversized_stock_returns_invalid_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;

        let result = ctx
            .products
            .create_product(
                producer,
                NewProduct {
                    uuid: ProductUuid::new(),
                    details: product_details(price("1.00"), u32::MAX),
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidStock(_))),
            "expected InvalidStock, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_product_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;
        let uuid = ProductUuid::new();

        ctx.products
            .create_product(
                producer,
                NewProduct {
                    uuid,
                    details: product_details(price("1.00"), 1),
                },
            )
            .await?;

        let result = ctx
            .products
            .create_product(
                producer,
                NewProduct {
                    uuid,
                    details: product_details(price("2.00"), 1),
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_product_includes_producer_display_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;
        let product = create_product(&ctx, producer, "3.00", 20).await?;

        let listed = ctx.products.get_product(product.uuid).await?;

        assert_eq!(listed.product.uuid, product.uuid);
        assert_eq!(listed.producer_name, "Test Producer");
        assert_eq!(listed.producer_location.as_deref(), Some("Valle Central"));

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_products_excludes_inactive_products() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;

        let visible = create_product(&ctx, producer, "3.00", 20).await?;
        let hidden = create_product(&ctx, producer, "2.50", 100).await?;

        ctx.set_active(producer, hidden.uuid, false).await?;

        let products = ctx.products.list_products().await?;
        let uuids: Vec<ProductUuid> = products.iter().map(|p| p.product.uuid).collect();

        assert!(uuids.contains(&visible.uuid), "active product should be listed");
        assert!(!uuids.contains(&hidden.uuid), "inactive product should be hidden");

        Ok(())
    }

    #[tokio::test]
    async fn list_products_empty_when_none_created() -> TestResult {
        let ctx = TestContext::new().await;

        let products = ctx.products.list_products().await?;

        assert!(products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn update_product_replaces_all_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;
        let product = create_product(&ctx, producer, "3.00", 20).await?;

        let details = ProductDetails {
            name: "Tomates Pera".to_string(),
            description: "De temporada.".to_string(),
            price: price("3.50"),
            unit: "caja".to_string(),
            stock: 7,
            category: "Verduras".to_string(),
            image_url: None,
            active: false,
        };

        let updated = ctx
            .products
            .update_product(
                producer,
                product.uuid,
                ProductUpdate {
                    details: details.clone(),
                },
            )
            .await?;

        assert_eq!(updated.uuid, product.uuid);
        assert_eq!(updated.name, details.name);
        assert_eq!(updated.price, price("3.50"));
        assert_eq!(updated.unit, "caja");
        assert_eq!(updated.stock, 7);
        assert!(!updated.active);

        Ok(())
    }

    #[tokio::test]
    async fn update_product_by_other_producer_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_producer().await?;
        let intruder = ctx.create_producer().await?;
        let product = create_product(&ctx, owner, "3.00", 20).await?;

        let result = ctx
            .products
            .update_product(
                intruder,
                product.uuid,
                ProductUpdate {
                    details: product_details(price("0.01"), 20),
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound for a foreign product, got {result:?}"
        );

        let unchanged = ctx.products.get_product(product.uuid).await?;

        assert_eq!(unchanged.product.price, price("3.00"));

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_makes_it_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let producer = ctx.create_producer().await?;
        let product = create_product(&ctx, producer, "3.00", 20).await?;

        ctx.products.delete_product(producer, product.uuid).await?;

        let result = ctx.products.get_product(product.uuid).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_by_other_producer_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_producer().await?;
        let intruder = ctx.create_producer().await?;
        let product = create_product(&ctx, owner, "3.00", 20).await?;

        let result = ctx.products.delete_product(intruder, product.uuid).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        ctx.products.get_product(product.uuid).await?;

        Ok(())
    }
}
