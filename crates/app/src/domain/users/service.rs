//! Users service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        products::PgProductsRepository,
        users::{
            data::NewUser,
            errors::UsersServiceError,
            records::{ProducerProfile, UserRecord, UserRole, UserUuid},
            repository::PgUsersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
    products_repository: PgProductsRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        if user.name.trim().is_empty() || !user.email.contains('@') {
            return Err(UsersServiceError::InvalidData);
        }

        let mut tx = self.db.begin_transaction().await?;

        let created = self.repository.create_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let user = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn get_producer_profile(
        &self,
        producer: UserUuid,
    ) -> Result<ProducerProfile, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let producer = self
            .repository
            .find_user_with_role(&mut tx, producer, UserRole::Producer)
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        let products = self
            .products_repository
            .list_producer_products(&mut tx, producer.uuid)
            .await?;

        tx.commit().await?;

        Ok(ProducerProfile { producer, products })
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Registers a producer or consumer profile.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;

    /// Retrieve a producer along with all of their products.
    async fn get_producer_profile(
        &self,
        producer: UserUuid,
    ) -> Result<ProducerProfile, UsersServiceError>;
}
