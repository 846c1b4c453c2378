use anyhow::{anyhow, Result};
/// JWT token generation and validation using HS256 (shared secret)
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Username at issue time
    pub username: String,
    /// Role at issue time ("user" or "admin")
    pub role: String,
}

/// Access token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

use std::sync::RwLock;

struct JwtState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: i64,
}

// Thread-safe storage for JWT state loaded from configuration
lazy_static! {
    static ref JWT_STATE: RwLock<Option<JwtState>> = RwLock::new(None);
}

/// Initialize JWT signing from the configured shared secret.
/// Must be called during application startup before any JWT operations.
pub fn initialize(secret: &str, access_token_ttl: i64) -> Result<()> {
    if secret.is_empty() {
        return Err(anyhow!("JWT secret must not be empty"));
    }

    let state = JwtState {
        encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        access_token_ttl,
    };

    let mut slot = JWT_STATE
        .write()
        .map_err(|e| anyhow!("Failed to acquire write lock on JWT state: {}", e))?;
    *slot = Some(state);

    Ok(())
}

/// Generate a new access token
pub fn generate_access_token(user_id: Uuid, username: &str, role: &str) -> Result<TokenResponse> {
    let slot = JWT_STATE
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT state: {}", e))?;
    let state = slot
        .as_ref()
        .ok_or_else(|| anyhow!("JWT not initialized. Call initialize() during startup"))?;

    let now = Utc::now();
    let expiry = now + Duration::seconds(state.access_token_ttl);

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        username: username.to_string(),
        role: role.to_string(),
    };

    let access_token = encode(&Header::default(), &claims, &state.encoding_key)
        .map_err(|e| anyhow!("Failed to generate access token: {}", e))?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.access_token_ttl,
    })
}

/// Validate a token and return its decoded claims
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let slot = JWT_STATE
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT state: {}", e))?;
    let state = slot
        .as_ref()
        .ok_or_else(|| anyhow!("JWT not initialized. Call initialize() during startup"))?;

    decode::<Claims>(token, &state.decoding_key, &Validation::default())
        .map_err(|e| anyhow!("Token validation failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        // Tests share the global state; initializing twice is harmless.
        initialize("test-secret-for-unit-tests", 3600).unwrap();
    }

    #[test]
    fn round_trip_token() {
        init();
        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id, "tessia", "admin").unwrap();
        assert_eq!(token.token_type, "Bearer");

        let data = validate_token(&token.access_token).unwrap();
        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.username, "tessia");
        assert_eq!(data.claims.role, "admin");
    }

    #[test]
    fn garbage_token_is_rejected() {
        init();
        assert!(validate_token("not.a.token").is_err());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(initialize("", 3600).is_err());
    }
}
