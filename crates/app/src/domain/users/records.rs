//! User Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{domain::products::records::ProductRecord, uuids::TypedUuid};

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// Marketplace role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Producer,
    Consumer,
}

#[derive(Debug, Error)]
#[error("unknown user role: {0}")]
pub struct UnknownUserRole(String);

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownUserRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "producer" => Ok(Self::Producer),
            "consumer" => Ok(Self::Consumer),
            other => Err(UnknownUserRole(other.to_string())),
        }
    }
}

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Producer Profile
///
/// A producer together with every product they own, active or not.
#[derive(Debug, Clone)]
pub struct ProducerProfile {
    pub producer: UserRecord,
    pub products: Vec<ProductRecord>,
}
