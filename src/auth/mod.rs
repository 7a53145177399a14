use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::models::User;

/// Uniform 401 message for every credential failure, so responses never hint
/// at whether the token was missing, expired, revoked or someone else's.
pub const CREDENTIALS_MESSAGE: &str = "Could not validate credentials";

/// Token purpose, carried in the `scope` claim. Access tokens authenticate
/// API calls; refresh tokens are only good for minting a new pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    #[serde(rename = "access_token")]
    Access,
    #[serde(rename = "refresh_token")]
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub scope: TokenScope,
    /// Random per-token id, so two tokens minted within the same second
    /// still differ and rotation can tell them apart.
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, scope: TokenScope) -> Self {
        let now = Utc::now();
        let security = &config::config().security;
        let ttl = match scope {
            TokenScope::Access => Duration::minutes(security.access_token_ttl_minutes),
            TokenScope::Refresh => Duration::days(security.refresh_token_ttl_days),
        };

        Self {
            sub: user.id,
            email: user.email.clone(),
            scope,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Access + refresh pair as returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
    InvalidToken(String),
    WrongScope,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::WrongScope => write!(f, "JWT token has the wrong scope"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Mint a fresh access + refresh pair for `user`.
pub fn issue_token_pair(user: &User) -> Result<TokenPair, JwtError> {
    let access_token = generate_jwt(Claims::new(user, TokenScope::Access))?;
    let refresh_token = generate_jwt(Claims::new(user, TokenScope::Refresh))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "bearer",
    })
}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Decode and validate a token, enforcing the expected scope.
pub fn verify_token(token: &str, expected_scope: TokenScope) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    if token_data.claims.scope != expected_scope {
        return Err(JwtError::WrongScope);
    }

    Ok(token_data.claims)
}
