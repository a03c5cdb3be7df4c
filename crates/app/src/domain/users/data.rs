//! User Data

use crate::domain::users::records::{UserRole, UserUuid};

/// New User Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub uuid: UserUuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
