use std::future::Future;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            CredentialsRequest, IsAdminRequest, IsAdminResponse, LoginResponse, MeResponse,
            RegisterAdminRequest, RegisterResponse,
        },
        error::{ApiError, AuthError},
        extractors::AuthUser,
    },
    state::AppState,
};

pub const AUTH_COOKIE: &str = "auth_token";
pub const ADMIN_COOKIE: &str = "isAdmin";

const AUTH_COOKIE_PATH: &str = "/auth/token";
const ADMIN_COOKIE_PATH: &str = "/auth/isAdmin";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/registerAsAdmin", post(register_as_admin))
        .route("/login", post(login))
        .route("/isAdmin", post(is_admin))
}

/// Session check lives on the same path the `auth_token` cookie is scoped to.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/token", get(get_me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::BadRequest);
    }
    Ok(email)
}

fn require_non_empty(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.is_empty() {
        warn!(field, "empty field");
        return Err(ApiError::BadRequest);
    }
    Ok(())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "failed to decode request body");
        ApiError::BadRequest
    })
}

/// Runs a service call under the per-request deadline. Dropping the future on
/// expiry cancels whatever store or issuer call is in flight.
async fn with_deadline<T>(
    state: &AppState,
    fut: impl Future<Output = Result<T, AuthError>>,
) -> Result<T, ApiError> {
    match tokio::time::timeout(state.request_timeout, fut).await {
        Ok(res) => Ok(res?),
        Err(_) => {
            warn!(timeout = ?state.request_timeout, "request deadline exceeded");
            Err(ApiError::Timeout)
        }
    }
}

fn session_cookie(name: &'static str, value: String, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path(path)
        .build()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let payload = body(payload)?;
    let email = normalize_email(&payload.email)?;
    require_non_empty(&payload.password, "password")?;

    let user_id = with_deadline(&state, state.auth.register_user(&email, &payload.password)).await?;

    info!(user_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "OK",
            user_id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register_as_admin(
    State(state): State<AppState>,
    payload: Result<Json<RegisterAdminRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let payload = body(payload)?;
    let email = normalize_email(&payload.email)?;
    require_non_empty(&payload.password, "password")?;
    require_non_empty(&payload.admin_secret, "admin_secret")?;

    let user_id = with_deadline(
        &state,
        state
            .auth
            .register_admin(&email, &payload.password, &payload.admin_secret),
    )
    .await?;

    info!(user_id, "admin registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "OK",
            user_id,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<LoginResponse>), ApiError> {
    let payload = body(payload)?;
    let email = normalize_email(&payload.email)?;
    require_non_empty(&payload.password, "password")?;

    let token = with_deadline(&state, state.auth.login(&email, &payload.password)).await?;

    let jar = jar.add(session_cookie(AUTH_COOKIE, token.clone(), AUTH_COOKIE_PATH));
    info!("user logged in");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(LoginResponse {
            status: "OK",
            token,
        }),
    ))
}

/// 202 for admins, 403 otherwise; both carry the `isAdmin` cookie.
#[instrument(skip(state, jar, payload))]
pub async fn is_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<IsAdminRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<IsAdminResponse>), ApiError> {
    let payload = body(payload)?;
    if payload.user_id <= 0 {
        warn!(user_id = payload.user_id, "invalid user id");
        return Err(ApiError::BadRequest);
    }

    let is_admin = with_deadline(&state, state.auth.is_admin(payload.user_id)).await?;

    let jar = jar.add(session_cookie(
        ADMIN_COOKIE,
        is_admin.to_string(),
        ADMIN_COOKIE_PATH,
    ));
    let status = if is_admin {
        StatusCode::ACCEPTED
    } else {
        StatusCode::FORBIDDEN
    };
    info!(user_id = payload.user_id, is_admin, "checked if user is admin");
    Ok((
        status,
        jar,
        Json(IsAdminResponse {
            status: "OK",
            is_admin,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(claims): AuthUser) -> Result<Json<MeResponse>, ApiError> {
    let id = claims.user_id().ok_or(ApiError::BadRequest)?;
    Ok(Json(MeResponse {
        id,
        email: claims.email,
    }))
}
