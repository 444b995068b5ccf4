use async_trait::async_trait;
use thiserror::Error;

use crate::auth::repo_types::User;

/// Failures reported by a credential store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Write side of the credential store.
#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Create a regular user, returning the new id.
    async fn save_user(&self, email: &str, pass_hash: &str) -> Result<i64, StorageError>;
    /// Create a user with the admin flag set, returning the new id.
    async fn save_admin(&self, email: &str, pass_hash: &str) -> Result<i64, StorageError>;
}

/// Read side of the credential store.
#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn user_by_email(&self, email: &str) -> Result<User, StorageError>;
    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError>;
}
