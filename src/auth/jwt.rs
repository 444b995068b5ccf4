use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::auth::{claims::Claims, repo_types::User};
use crate::config::JwtConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt signing secret is not configured")]
    MissingSecret,
    #[error("token subject is not a user id")]
    BadSubject,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Produces signed, time-bounded session tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User, ttl: Duration) -> Result<String, TokenError>;
}

/// HS256 signing and verification keys with issuer/audience settings.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl JwtKeys {
    pub fn new(secret: &str, issuer: &str, audience: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        })
    }

    pub fn from_config(cfg: &JwtConfig) -> Result<Self, TokenError> {
        Self::new(&cfg.secret, &cfg.issuer, &cfg.audience)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation
    }

    /// Checks algorithm, signature, expiry, issuer and audience.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation())?;
        if data.claims.user_id().is_none() {
            return Err(TokenError::BadSubject);
        }
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl TokenIssuer for JwtKeys {
    fn issue(&self, user: &User, ttl: Duration) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = user.id, "jwt signed");
        Ok(token)
    }
}
