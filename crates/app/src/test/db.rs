//! Database test utilities and shared infrastructure

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

use crate::database::{self, MIGRATOR, PoolSettings};

const TEST_USER: &str = "huerto_test";
const TEST_PASSWORD: &str = "huerto_test_password";

/// Database names are interpolated into DDL, so only plain identifiers are allowed.
fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("Database name must be 1-63 characters long".to_string());
    }

    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err("Database name must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Database name can only contain letters, digits and underscores".to_string());
    }

    Ok(())
}

fn server_url(host: &str, port: u16, db_name: &str) -> String {
    format!("postgresql://{TEST_USER}:{TEST_PASSWORD}@{host}:{port}/{db_name}")
}

fn container_host() -> String {
    std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string())
}

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(TEST_USER)
        .with_password(TEST_PASSWORD)
        .with_db_name("huerto_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

/// Shared PostgreSQL container that starts once and is reused across all tests
static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Cleanup channel for database cleanup requests
static CLEANUP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn init_cleanup_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(db_name) = receiver.recv().await {
            if let Err(err) = drop_database(&db_name).await {
                eprintln!("Failed to drop test database '{db_name}': {err}");
            }
        }
    });

    sender
}

async fn drop_database(db_name: &str) -> Result<(), sqlx::Error> {
    let Some(container) = POSTGRES_CONTAINER.get() else {
        return Ok(());
    };

    let Ok(port) = container.get_host_port_ipv4(5432).await else {
        return Ok(());
    };

    if validate_database_name(db_name).is_err() {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&server_url(&container_host(), port, "postgres")).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// Test database
///
/// Every `TestDb` is a freshly migrated database inside one shared PostgreSQL
/// container. Services commit normally; isolation comes from each test owning its
/// own database, which is dropped when the `TestDb` goes out of scope.
#[derive(Debug, Clone)]
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = CLEANUP_SENDER.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    /// Create an isolated test database with a unique generated name.
    pub async fn new() -> Self {
        let name = format!("huerto_test_{}", uuid::Uuid::now_v7().simple());

        Self::new_with_db_name(&name).await
    }

    /// Create an isolated test database with the given name.
    pub async fn new_with_db_name(db_name: &str) -> Self {
        CLEANUP_SENDER.get_or_init(init_cleanup_task).await;

        if let Err(error) = validate_database_name(db_name) {
            panic!("Invalid database name '{db_name}': {error}");
        }

        let container = POSTGRES_CONTAINER
            .get_or_init(init_postgres_container)
            .await;

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get container port");

        let host = container_host();

        let mut conn = PgConnection::connect(&server_url(&host, port, "postgres"))
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let pool = database::connect(&server_url(&host, port, db_name), PoolSettings::default())
            .await
            .expect("Failed to create pool for database");

        MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self {
            pool,
            name: db_name.to_string(),
        }
    }

    /// Returns the connection pool for this test database.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use sqlx::query;

    use super::*;

    #[test]
    fn validate_database_name_accepts_identifiers() {
        assert!(validate_database_name("valid_name").is_ok());
        assert!(validate_database_name("_underscore_start").is_ok());
        assert!(validate_database_name("huerto_test_0192ab").is_ok());
    }

    #[test]
    fn validate_database_name_rejects_bad_names() {
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
        assert!(validate_database_name("123invalid").is_err());
        assert!(validate_database_name("invalid-hyphen").is_err());
        assert!(validate_database_name("bad\"; DROP").is_err());
    }

    #[tokio::test]
    async fn migrations_create_marketplace_tables() {
        let test_db = TestDb::new().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name <> '_sqlx_migrations' \
             ORDER BY table_name",
        )
        .fetch_all(test_db.pool())
        .await
        .expect("Failed to list tables");

        assert_eq!(tables, vec!["order_items", "orders", "products", "users"]);
    }

    #[tokio::test]
    async fn stock_cannot_go_negative() {
        let test_db = TestDb::new().await;
        let producer = uuid::Uuid::now_v7();
        let product = uuid::Uuid::now_v7();

        query("INSERT INTO users (uuid, name, email, role) VALUES ($1, 'P', 'p@example.test', 'producer')")
            .bind(producer)
            .execute(test_db.pool())
            .await
            .expect("Failed to insert producer");

        query("INSERT INTO products (uuid, producer_uuid, name, price, unit, stock) VALUES ($1, $2, 'Miel', 5.00, 'tarro', 1)")
            .bind(product)
            .bind(producer)
            .execute(test_db.pool())
            .await
            .expect("Failed to insert product");

        let result = query("UPDATE products SET stock = stock - 2 WHERE uuid = $1")
            .bind(product)
            .execute(test_db.pool())
            .await;

        let code = result
            .err()
            .and_then(|e| e.as_database_error().and_then(|e| e.code().map(|c| c.into_owned())));

        assert_eq!(code.as_deref(), Some("23514"), "expected a check violation");
    }

    #[tokio::test]
    async fn order_item_prices_are_immutable() {
        let test_db = TestDb::new().await;
        let consumer = uuid::Uuid::now_v7();
        let order = uuid::Uuid::now_v7();
        let item = uuid::Uuid::now_v7();

        query("INSERT INTO users (uuid, name, email, role) VALUES ($1, 'C', 'c@example.test', 'consumer')")
            .bind(consumer)
            .execute(test_db.pool())
            .await
            .expect("Failed to insert consumer");

        query("INSERT INTO orders (uuid, consumer_uuid, total) VALUES ($1, $2, 6.00)")
            .bind(order)
            .bind(consumer)
            .execute(test_db.pool())
            .await
            .expect("Failed to insert order");

        query("INSERT INTO order_items (uuid, order_uuid, quantity, price) VALUES ($1, $2, 2, 3.00)")
            .bind(item)
            .bind(order)
            .execute(test_db.pool())
            .await
            .expect("Failed to insert order item");

        let result = query("UPDATE order_items SET price = 1.00 WHERE uuid = $1")
            .bind(item)
            .execute(test_db.pool())
            .await;

        assert!(result.is_err(), "line item price should not change");
    }
}
