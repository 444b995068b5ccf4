use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .merge(handlers::auth_routes())
            .merge(handlers::session_routes()),
    )
}
