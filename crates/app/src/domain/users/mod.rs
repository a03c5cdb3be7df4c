//! Users
//!
//! Producers own products, consumers place orders. Credentials live with the
//! external identity provider, so only profile fields are stored here.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::UsersServiceError;
pub(crate) use repository::PgUsersRepository;
pub use service::*;
