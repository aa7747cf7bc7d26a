use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "Users";

/// Stored login identity. The password is compared as-is.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub email: String,
    pub password: String,
}
