use serde::{Deserialize, Serialize};

/// Request body for `/register` and `/login`.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `/registerAsAdmin`.
#[derive(Deserialize)]
pub struct RegisterAdminRequest {
    pub email: String,
    pub password: String,
    pub admin_secret: String,
}

/// Request body for `/isAdmin`.
#[derive(Debug, Deserialize)]
pub struct IsAdminRequest {
    #[serde(rename = "userID")]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    #[serde(rename = "userID")]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct IsAdminResponse {
    pub status: &'static str,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Identity recovered from a verified session token.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
}
