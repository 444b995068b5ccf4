use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub admin_secret: Option<String>,
    pub http: HttpConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_issuer", &self.jwt.issuer)
            .field("jwt_audience", &self.jwt.audience)
            .field("jwt_ttl_minutes", &self.jwt.ttl_minutes)
            .field("admin_secret_set", &self.admin_secret.is_some())
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "sso-gateway".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "sso-gateway-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60),
        };
        let admin_secret = std::env::var("ADMIN_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        let http = HttpConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("APP_PORT", 8080),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 4),
        };
        Ok(Self {
            database_url,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            jwt,
            admin_secret,
            http,
        })
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs((self.jwt.ttl_minutes.max(0) as u64).saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ttl_minutes: i64) -> AppConfig {
        AppConfig {
            database_url: "postgres://user:hunter2@db/sso".into(),
            db_max_connections: 5,
            jwt: JwtConfig {
                secret: "jwt-signing-key".into(),
                issuer: "iss".into(),
                audience: "aud".into(),
                ttl_minutes,
            },
            admin_secret: Some("top-secret".into()),
            http: HttpConfig {
                host: "127.0.0.1".into(),
                port: 8080,
                request_timeout_secs: 4,
            },
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = config(15);
        let out = format!("{cfg:?}");
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("jwt-signing-key"));
        assert!(!out.contains("top-secret"));
        assert!(out.contains("admin_secret_set: true"));
        assert_eq!(cfg.token_ttl(), Duration::from_secs(15 * 60));
    }

    #[test]
    fn token_ttl_saturates_and_clamps() {
        assert_eq!(config(i64::MAX).token_ttl(), Duration::from_secs(u64::MAX));
        assert_eq!(config(-5).token_ttl(), Duration::ZERO);
    }
}
