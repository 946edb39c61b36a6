use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub status: String, // defaults to "active" when empty
}

/// Full overwrite of the mutable fields (PUT).
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: String,
}

/// Partial overwrite (PATCH); absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct PatchUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub status: String,
}

/// User as exposed over HTTP. Password never appears here.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_created: String,
    pub status: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            date_created: u.date_created,
            status: u.status,
        }
    }
}
