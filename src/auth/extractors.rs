use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::{claims::Claims, handlers::AUTH_COOKIE, jwt::JwtKeys};

/// Verified session: reads the `auth_token` cookie or a Bearer header.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let from_cookie = CookieJar::from_headers(&parts.headers)
            .get(AUTH_COOKIE)
            .map(|c| c.value().to_owned());
        let token = match from_cookie {
            Some(t) => t,
            None => parts
                .headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
                .map(str::to_owned)
                .ok_or((StatusCode::UNAUTHORIZED, "missing session token".to_string()))?,
        };

        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            (StatusCode::UNAUTHORIZED, "invalid or expired token".to_string())
        })?;

        Ok(AuthUser(claims))
    }
}
