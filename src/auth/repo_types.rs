use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                      // store-assigned identity
    pub email: String,                // login key, unique
    #[serde(skip_serializing)]
    pub pass_hash: String,            // Argon2 PHC string, not exposed in JSON
    pub is_admin: bool,               // fixed at creation
    pub created_at: OffsetDateTime,   // creation timestamp
}
