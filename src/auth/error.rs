use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Business errors returned by [`AuthService`](super::services::AuthService).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user not found")]
    UserNotFound,
    #[error("the provided admin secret is wrong")]
    WrongAdminSecret,
    /// Cause is kept for logs only; Display never shows it.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        AuthError::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::UserAlreadyExists => StatusCode::CONFLICT,
            AuthError::WrongAdminSecret => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::UserAlreadyExists => "You cannot register the existing user",
            AuthError::WrongAdminSecret => "You have provided the wrong admin secret",
            AuthError::UserNotFound => "Not found",
            AuthError::Internal(_) => "Unknown internal error",
        }
    }
}

/// JSON body shared by every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "Error",
            error: message.into(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(cause) = &self {
            error!(error = ?cause, "request failed");
        }
        (self.status(), Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

/// Failures of the HTTP layer: bad request shape, expired deadline, or a
/// domain error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request")]
    BadRequest,
    #[error("request deadline exceeded")]
    Timeout,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody::new("Invalid request"))).into_response()
            }
            ApiError::Timeout => {
                (StatusCode::GATEWAY_TIMEOUT, Json(ErrorBody::new("Request timed out")))
                    .into_response()
            }
            ApiError::Auth(e) => e.into_response(),
        }
    }
}
