//! JWT token handling
//!
//! Every token this service issues shares one claims shape; the `type`
//! claim is a closed enumeration and is checked on every decode, so the
//! signing secret alone never distinguishes token purposes.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Issuer claim
    pub issuer: String,
    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_days: i64,
    /// Email verification / change-email token lifetime in days
    pub email_token_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secret-key-change-in-production".to_string()),
            issuer: "platzigram".to_string(),
            access_token_minutes: 60,
            refresh_token_days: 30,
            email_token_days: 3,
        }
    }
}

/// The purpose a token was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    EmailConfirmation,
    ChangeEmail,
}

impl TokenKind {
    fn lifetime(&self, config: &JwtConfig) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(config.access_token_minutes),
            TokenKind::Refresh => Duration::days(config.refresh_token_days),
            TokenKind::EmailConfirmation | TokenKind::ChangeEmail => {
                Duration::days(config.email_token_days)
            }
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Token purpose
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Token id, used to revoke individual refresh tokens
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(user_id: &str, username: &str, kind: TokenKind, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + kind.lifetime(config);

        Self {
            sub: user_id.to_string(),
            username: username.to_string(),
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn expires_at(&self) -> chrono::DateTime<Utc> {
        chrono::DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not valid")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("token type mismatch")]
    WrongKind,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// Sign a token of the given kind for a user.
pub fn create_token(
    user_id: &str,
    username: &str,
    kind: TokenKind,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, username, kind, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(TokenError::from)
}

/// Verify signature, expiry, issuer and purpose, and return the claims.
pub fn verify_token(
    token: &str,
    expected: TokenKind,
    config: &JwtConfig,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    if token_data.claims.kind != expected {
        return Err(TokenError::WrongKind);
    }

    Ok(token_data.claims)
}
