//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    products::{
        data::ProductDetails,
        records::{CatalogProduct, ProductRecord, ProductUuid},
    },
    users::records::UserUuid,
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const LIST_PRODUCER_PRODUCTS_SQL: &str = include_str!("sql/list_producer_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const LOCK_PRODUCTS_SQL: &str = include_str!("sql/lock_products.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StockDecrement {
    /// Exactly one row was updated; carries the stock left afterwards.
    Applied { remaining: u32 },

    /// No row matched: the product is gone, inactive, or short of stock.
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CatalogProduct>, sqlx::Error> {
        query_as::<Postgres, CatalogProduct>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_producer_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        producer: UserUuid,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCER_PRODUCTS_SQL)
            .bind(producer.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<CatalogProduct, sqlx::Error> {
        query_as::<Postgres, CatalogProduct>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Lock the given products `FOR UPDATE` in UUID order.
    ///
    /// Concurrent orders touching overlapping products acquire their locks in the
    /// same order, so they queue behind each other instead of deadlocking.
    /// Unknown UUIDs are silently absent from the result.
    pub(crate) async fn lock_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.iter().map(|uuid| uuid.into_uuid()).collect();

        query_as::<Postgres, ProductRecord>(LOCK_PRODUCTS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        producer: UserUuid,
        product: ProductUuid,
        details: ProductDetails,
    ) -> Result<ProductRecord, sqlx::Error> {
        let stock = stock_to_i32(details.stock)?;

        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(producer.into_uuid())
            .bind(details.name)
            .bind(details.description)
            .bind(details.price)
            .bind(details.unit)
            .bind(stock)
            .bind(details.category)
            .bind(details.image_url)
            .bind(details.active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        producer: UserUuid,
        product: ProductUuid,
        details: ProductDetails,
    ) -> Result<ProductRecord, sqlx::Error> {
        let stock = stock_to_i32(details.stock)?;

        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(producer.into_uuid())
            .bind(details.name)
            .bind(details.description)
            .bind(details.price)
            .bind(details.unit)
            .bind(stock)
            .bind(details.category)
            .bind(details.image_url)
            .bind(details.active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        producer: UserUuid,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(producer.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Decrement stock by `quantity` only if the result stays non-negative.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<StockDecrement, sqlx::Error> {
        let quantity = stock_to_i32(quantity)?;

        let remaining: Option<i32> = query_scalar(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(quantity)
            .fetch_optional(&mut **tx)
            .await?;

        match remaining {
            Some(stock) => Ok(StockDecrement::Applied {
                remaining: stock_from_i32(stock, "stock")?,
            }),
            None => Ok(StockDecrement::Rejected),
        }
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let stock = stock_from_i32(row.try_get("stock")?, "stock")?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            producer_uuid: UserUuid::from_uuid(row.try_get("producer_uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            unit: row.try_get("unit")?,
            stock,
            category: row.try_get("category")?,
            image_url: row.try_get("image_url")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CatalogProduct {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product: ProductRecord::from_row(row)?,
            producer_name: row.try_get("producer_name")?,
            producer_location: row.try_get("producer_location")?,
        })
    }
}

fn stock_to_i32(stock: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(stock).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn stock_from_i32(stock: i32, col: &str) -> Result<u32, sqlx::Error> {
    u32::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
