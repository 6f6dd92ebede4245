//! Session tokens.
//!
//! A signed-in user carries an HS256 JWT in a cookie. Claims and token
//! handling live here so the API layer and the binary agree on the format.

use anyhow::anyhow;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModuleHubError, ModuleHubResult};

/// JWT claims embedded in session tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as string)
    pub sub: String,
    /// GitHub login
    pub login: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        self.sub.parse().ok()
    }
}

/// Issue a session token for a user.
///
/// Fails when `ttl_secs` pushes the expiry past what a timestamp can hold.
pub fn issue_token(
    user_id: Uuid,
    login: &str,
    secret: &str,
    ttl_secs: u64,
) -> ModuleHubResult<String> {
    let now = Utc::now();
    let exp = i64::try_from(ttl_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| anyhow!("session lifetime of {ttl_secs}s is out of range"))?;

    let claims = Claims {
        sub: user_id.to_string(),
        login: login.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ModuleHubError::Internal(e.into()))
}

/// Validate and decode a session token.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
