//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        orders::{
            data::NewOrder,
            errors::{MissingReference, OrdersServiceError},
            records::{OrderItemRecord, OrderRecord, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
        },
        products::{
            PgProductsRepository, StockDecrement,
            records::{ProductRecord, ProductUuid},
        },
        users::{
            PgUsersRepository,
            records::{UserRole, UserUuid},
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    products_repository: PgProductsRepository,
    users_repository: PgUsersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            users_repository: PgUsersRepository::new(),
        }
    }
}

/// Total quantity requested per product, summed across duplicate lines.
fn demand(order: &NewOrder) -> FxHashMap<ProductUuid, u64> {
    let mut demand = FxHashMap::default();

    for item in &order.items {
        // Quantities are positive once validated.
        *demand.entry(item.product_uuid).or_insert(0) += u64::from(item.quantity.unsigned_abs());
    }

    demand
}

/// Check every line against the locked catalog rows: the product must exist and be
/// orderable, the submitted price must be current and the cumulative quantity must
/// be in stock.
fn check_against_catalog(
    order: &NewOrder,
    products: &FxHashMap<ProductUuid, ProductRecord>,
    demand: &FxHashMap<ProductUuid, u64>,
) -> Result<(), OrdersServiceError> {
    for item in &order.items {
        let product = products
            .get(&item.product_uuid)
            .filter(|product| product.active)
            .ok_or(OrdersServiceError::NotFound(MissingReference::Product(
                item.product_uuid,
            )))?;

        if item.price != product.price {
            return Err(OrdersServiceError::PriceChanged {
                product: product.uuid,
                submitted: item.price,
                current: product.price,
            });
        }

        let requested = demand.get(&product.uuid).copied().unwrap_or_default();

        if requested > u64::from(product.stock) {
            return Err(OrdersServiceError::InsufficientStock {
                product: product.uuid,
                requested,
                available: product.stock,
            });
        }
    }

    Ok(())
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn place_order(&self, order: NewOrder) -> Result<OrderUuid, OrdersServiceError> {
        order.validate()?;

        let mut tx = self.db.begin_transaction().await?;

        let consumer = self
            .users_repository
            .find_user_with_role(&mut tx, order.consumer_uuid, UserRole::Consumer)
            .await?;

        if consumer.is_none() {
            return Err(OrdersServiceError::NotFound(MissingReference::Consumer));
        }

        let demand = demand(&order);

        let mut product_uuids: SmallVec<[ProductUuid; 4]> = demand.keys().copied().collect();
        product_uuids.sort_unstable();

        let products: FxHashMap<ProductUuid, ProductRecord> = self
            .products_repository
            .lock_products(&mut tx, &product_uuids)
            .await?
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect();

        check_against_catalog(&order, &products, &demand)?;

        self.orders_repository
            .create_order(&mut tx, order.uuid, order.consumer_uuid, order.total)
            .await?;

        for item in &order.items {
            self.items_repository
                .create_order_item(
                    &mut tx,
                    order.uuid,
                    item.product_uuid,
                    item.quantity,
                    item.price,
                )
                .await?;
        }

        for product in product_uuids {
            let requested = demand.get(&product).copied().unwrap_or_default();
            let available = products.get(&product).map_or(0, |p| p.stock);

            // Checked against stock above, so the quantity fits.
            let quantity = u32::try_from(requested).unwrap_or(u32::MAX);

            match self
                .products_repository
                .decrement_stock(&mut tx, product, quantity)
                .await?
            {
                StockDecrement::Applied { remaining } => {
                    debug!(product_uuid = %product, quantity, remaining, "decremented stock");
                }
                StockDecrement::Rejected => {
                    return Err(OrdersServiceError::InsufficientStock {
                        product,
                        requested,
                        available,
                    });
                }
            }
        }

        tx.commit().await?;

        info!(
            order_uuid = %order.uuid,
            consumer_uuid = %order.consumer_uuid,
            total = %order.total,
            lines = order.items.len(),
            "placed order"
        );

        Ok(order.uuid)
    }

    async fn list_orders(
        &self,
        consumer: UserUuid,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let mut orders = self
            .orders_repository
            .list_consumer_orders(&mut tx, consumer)
            .await?;

        if orders.is_empty() {
            tx.commit().await?;

            return Ok(orders);
        }

        let order_uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        let items = self
            .items_repository
            .list_order_items(&mut tx, &order_uuids)
            .await?;

        tx.commit().await?;

        let mut items_by_order: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for item in items {
            items_by_order.entry(item.order_uuid).or_default().push(item);
        }

        for order in &mut orders {
            order.items = items_by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place an order: create the order and its line items and decrement stock for
    /// every line, all in one transaction.
    ///
    /// Resubmitting the same cart places a second order.
    async fn place_order(&self, order: NewOrder) -> Result<OrderUuid, OrdersServiceError>;

    /// Orders placed by a consumer, newest first, with their line items.
    async fn list_orders(&self, consumer: UserUuid)
    -> Result<Vec<OrderRecord>, OrdersServiceError>;
}
