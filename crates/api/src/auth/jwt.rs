//! ID token generation and validation.
//!
//! ID tokens are HS256-signed JWTs carrying [`IdClaims`]. Email
//! verification codes are opaque random strings; only their SHA-256 hash
//! is kept by the provider.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::IdentityConfig;

/// Claims embedded in every ID token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdClaims {
    /// Subject -- the account uid.
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    /// The `role` custom claim, absent until set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Generate an HS256 ID token.
pub fn generate_id_token(
    uid: &str,
    email: &str,
    email_verified: bool,
    role: Option<&str>,
    config: &IdentityConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = IdClaims {
        sub: uid.to_string(),
        email: email.to_string(),
        email_verified,
        role: role.map(str::to_string),
        exp: now + config.token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
}

/// Validate and decode an ID token, returning the embedded [`IdClaims`].
///
/// Validates the signature and expiration.
pub fn validate_token(
    token: &str,
    config: &IdentityConfig,
) -> Result<IdClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<IdClaims>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Generate a random action code, returning `(plaintext, sha256_hex_hash)`.
pub fn generate_action_code() -> (String, String) {
    let plaintext = Uuid::new_v4().simple().to_string();
    let hash = hash_action_code(&plaintext);
    (plaintext, hash)
}

/// SHA-256 hex digest of an action code.
pub fn hash_action_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}
