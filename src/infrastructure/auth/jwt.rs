//! Session token generation and validation (HS256)

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user UUID)
    pub sub: String,
    /// Email at issue time
    pub email: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    /// Create new claims for a user
    pub fn new(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<UserId, DomainError> {
        Uuid::parse_str(&self.sub)
            .map(UserId::from_uuid)
            .map_err(|_| DomainError::unauthorized("Session subject is not a user id"))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Configuration for JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// Trait for session token operations
pub trait JwtGenerator: Send + Sync + Debug {
    /// Issue a token for a user
    fn generate(&self, user: &User) -> Result<(String, JwtClaims), DomainError>;

    /// Validate a token and return the claims
    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError>;

    /// Get the token expiration time in hours
    fn expiration_hours(&self) -> u64;
}

/// HS256 token service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }
}

impl JwtGenerator for JwtService {
    fn generate(&self, user: &User) -> Result<(String, JwtClaims), DomainError> {
        let claims = JwtClaims::new(user, self.config.expiration_hours);

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))?;

        Ok((token, claims))
    }

    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| DomainError::unauthorized(format!("Invalid session token: {}", e)))?;

        Ok(token_data.claims)
    }

    fn expiration_hours(&self) -> u64 {
        self.config.expiration_hours
    }
}
