use std::sync::Arc;
use std::time::Duration;

use subtle::ConstantTimeEq;
use tracing::{error, info, instrument, warn};

use crate::auth::{
    error::AuthError,
    jwt::TokenIssuer,
    password::{hash_password_blocking, verify_dummy_password, verify_password_blocking},
    repo::{StorageError, UserProvider, UserSaver},
};

/// Shared secret gating admin self-registration.
#[derive(Clone)]
pub struct AdminSecret(String);

impl AdminSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn matches(&self, provided: &str) -> bool {
        self.0.as_bytes().ct_eq(provided.as_bytes()).into()
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret(**redacted**)")
    }
}

/// Registration, login and admin checks over the credential store.
///
/// Holds no mutable state; one instance is shared by every request.
pub struct AuthService {
    saver: Arc<dyn UserSaver>,
    provider: Arc<dyn UserProvider>,
    tokens: Arc<dyn TokenIssuer>,
    token_ttl: Duration,
    admin_secret: Option<AdminSecret>,
}

impl AuthService {
    pub fn new(
        saver: Arc<dyn UserSaver>,
        provider: Arc<dyn UserProvider>,
        tokens: Arc<dyn TokenIssuer>,
        token_ttl: Duration,
        admin_secret: Option<AdminSecret>,
    ) -> Self {
        Self {
            saver,
            provider,
            tokens,
            token_ttl,
            admin_secret,
        }
    }

    #[instrument(skip(self, password), fields(op = "auth.register_user"))]
    pub async fn register_user(&self, email: &str, password: &str) -> Result<i64, AuthError> {
        info!("registering user");
        let hash = hash_password_blocking(password).await.map_err(|e| {
            error!(error = %e, "failed to hash password");
            AuthError::Internal(e)
        })?;

        let id = self
            .saver
            .save_user(email, &hash)
            .await
            .map_err(|e| save_error(e, "failed to save user"))?;

        info!(user_id = id, "user registered");
        Ok(id)
    }

    /// Secret check runs before any hashing or storage work.
    #[instrument(skip(self, password, provided_secret), fields(op = "auth.register_admin"))]
    pub async fn register_admin(
        &self,
        email: &str,
        password: &str,
        provided_secret: &str,
    ) -> Result<i64, AuthError> {
        info!("registering admin");
        let Some(secret) = &self.admin_secret else {
            error!("admin secret is not configured");
            return Err(AuthError::internal(anyhow::anyhow!(
                "admin secret is not configured"
            )));
        };
        if !secret.matches(provided_secret) {
            warn!("wrong admin secret");
            return Err(AuthError::WrongAdminSecret);
        }

        let hash = hash_password_blocking(password).await.map_err(|e| {
            error!(error = %e, "failed to hash password");
            AuthError::Internal(e)
        })?;

        let id = self
            .saver
            .save_admin(email, &hash)
            .await
            .map_err(|e| save_error(e, "failed to save admin"))?;

        info!(user_id = id, "admin registered");
        Ok(id)
    }

    /// Unknown email and wrong password both yield `InvalidCredentials`.
    #[instrument(skip(self, password), fields(op = "auth.login"))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        info!("attempting to login user");
        let user = match self.provider.user_by_email(email).await {
            Ok(user) => user,
            Err(StorageError::UserNotFound) => {
                warn!("user not found");
                verify_dummy_password(password).await;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "failed to get user");
                return Err(AuthError::internal(e));
            }
        };

        let ok = verify_password_blocking(password, &user.pass_hash)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user.id, "failed to verify password");
                AuthError::Internal(e)
            })?;
        if !ok {
            warn!(user_id = user.id, "invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user, self.token_ttl).map_err(|e| {
            error!(error = %e, user_id = user.id, "failed to generate token");
            AuthError::internal(e)
        })?;

        info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    #[instrument(skip(self), fields(op = "auth.is_admin"))]
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        match self.provider.is_admin(user_id).await {
            Ok(is_admin) => {
                info!(is_admin, "checked if user is admin");
                Ok(is_admin)
            }
            Err(StorageError::UserNotFound) => {
                warn!("user not found");
                Err(AuthError::UserNotFound)
            }
            Err(e) => {
                error!(error = %e, "failed to check admin flag");
                Err(AuthError::internal(e))
            }
        }
    }
}

fn save_error(err: StorageError, msg: &'static str) -> AuthError {
    match err {
        StorageError::UserExists => {
            warn!("user already exists");
            AuthError::UserAlreadyExists
        }
        other => {
            error!(error = %other, "{msg}");
            AuthError::internal(other)
        }
    }
}
