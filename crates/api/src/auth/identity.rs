//! The identity-provider interface consumed by handlers and middleware.

use async_trait::async_trait;
use careers_core::types::DocId;
use serde::Serialize;

/// An account as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub uid: DocId,
    pub email: String,
    pub email_verified: bool,
}

/// The verified contents of an ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub uid: DocId,
    pub email: String,
    pub email_verified: bool,
    /// The `role` custom claim, if one has been set.
    pub role: Option<String>,
}

/// A freshly issued ID token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub id_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Provider failures. The display text is returned to clients in `error`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IdentityError {
    #[error("The email address is already in use by another account.")]
    EmailAlreadyExists,

    #[error("The email address is improperly formatted.")]
    InvalidEmail,

    #[error("The password must be a string with at least {0} characters.")]
    WeakPassword(usize),

    #[error("There is no user record corresponding to the provided identifier.")]
    UserNotFound,

    #[error("The email or password is incorrect.")]
    InvalidCredentials,

    #[error("Decoding ID token failed: {0}")]
    InvalidToken(String),

    #[error("The action code is invalid or has already been used.")]
    InvalidActionCode,

    #[error("Identity provider error: {0}")]
    Internal(String),
}

/// Account management and token verification.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(&self, email: &str, password: &str) -> Result<UserRecord, IdentityError>;

    /// Set the `role` custom claim carried by future tokens.
    async fn set_custom_claims(&self, uid: &str, role: &str) -> Result<(), IdentityError>;

    /// Produce a link that marks the account's email as verified.
    async fn generate_email_verification_link(&self, email: &str)
        -> Result<String, IdentityError>;

    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken, IdentityError>;

    /// Exchange credentials for an ID token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken, IdentityError>;

    /// Consume a verification code produced by
    /// [`generate_email_verification_link`](Self::generate_email_verification_link).
    async fn verify_email(&self, code: &str) -> Result<UserRecord, IdentityError>;

    async fn delete_user(&self, uid: &str) -> Result<(), IdentityError>;
}
