// 👤 User Entity - a login principal with a bcrypt password hash

use serde::Serialize;

pub const DEFAULT_ROLE: &str = "USER";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,

    /// bcrypt hash, never the plain password
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub full_name: String,
    pub role: String,
}
