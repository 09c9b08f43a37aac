//! In-process identity provider.
//!
//! Accounts live in memory with Argon2id password hashes; ID tokens are
//! HS256 JWTs signed with the configured secret. Verification links point
//! at `GET /auth/verify-email` on this server.

use std::collections::HashMap;

use async_trait::async_trait;
use careers_core::types::{new_doc_id, DocId};
use careers_core::validation::validate_email;
use tokio::sync::RwLock;

use super::identity::{DecodedToken, IdentityError, IdentityProvider, IssuedToken, UserRecord};
use super::jwt::{generate_action_code, generate_id_token, hash_action_code, validate_token};
use super::password::{hash_password, is_strong_enough, verify_password, MIN_PASSWORD_LENGTH};
use crate::config::IdentityConfig;

struct Account {
    uid: DocId,
    email: String,
    password_hash: String,
    email_verified: bool,
    role: Option<String>,
}

impl Account {
    fn record(&self) -> UserRecord {
        UserRecord {
            uid: self.uid.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
        }
    }
}

#[derive(Default)]
struct Accounts {
    by_uid: HashMap<DocId, Account>,
    /// Lower-cased email to uid.
    by_email: HashMap<String, DocId>,
    /// SHA-256 of outstanding verification codes to uid.
    action_codes: HashMap<String, DocId>,
}

/// Identity provider that keeps accounts in process memory.
pub struct LocalIdentity {
    config: IdentityConfig,
    verify_url: String,
    accounts: RwLock<Accounts>,
}

impl LocalIdentity {
    /// `public_base_url` prefixes the verification links handed out.
    pub fn new(config: IdentityConfig, public_base_url: &str) -> Self {
        Self {
            config,
            verify_url: format!("{}/auth/verify-email", public_base_url.trim_end_matches('/')),
            accounts: RwLock::new(Accounts::default()),
        }
    }

    /// Number of accounts, for diagnostics and tests.
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.by_uid.len()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn create_user(&self, email: &str, password: &str) -> Result<UserRecord, IdentityError> {
        let email = email.trim();
        validate_email(email).map_err(|_| IdentityError::InvalidEmail)?;
        if !is_strong_enough(password) {
            return Err(IdentityError::WeakPassword(MIN_PASSWORD_LENGTH));
        }
        let password_hash =
            hash_password(password).map_err(|e| IdentityError::Internal(e.to_string()))?;

        let mut accounts = self.accounts.write().await;
        let key = normalize_email(email);
        if accounts.by_email.contains_key(&key) {
            return Err(IdentityError::EmailAlreadyExists);
        }

        let account = Account {
            uid: new_doc_id(),
            email: email.to_string(),
            password_hash,
            email_verified: self.config.auto_verify_email,
            role: None,
        };
        let record = account.record();
        accounts.by_email.insert(key, account.uid.clone());
        accounts.by_uid.insert(account.uid.clone(), account);

        tracing::info!(uid = %record.uid, "Identity account created");
        Ok(record)
    }

    async fn set_custom_claims(&self, uid: &str, role: &str) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .by_uid
            .get_mut(uid)
            .ok_or(IdentityError::UserNotFound)?;
        account.role = Some(role.to_string());
        Ok(())
    }

    async fn generate_email_verification_link(
        &self,
        email: &str,
    ) -> Result<String, IdentityError> {
        let mut accounts = self.accounts.write().await;
        let uid = accounts
            .by_email
            .get(&normalize_email(email))
            .cloned()
            .ok_or(IdentityError::UserNotFound)?;

        let (code, hash) = generate_action_code();
        accounts.action_codes.insert(hash, uid);
        Ok(format!("{}?code={code}", self.verify_url))
    }

    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken, IdentityError> {
        let claims = validate_token(token, &self.config)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        // Tokens of deleted accounts are no longer honoured.
        if !self.accounts.read().await.by_uid.contains_key(&claims.sub) {
            return Err(IdentityError::UserNotFound);
        }

        Ok(DecodedToken {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            role: claims.role,
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken, IdentityError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .by_email
            .get(&normalize_email(email))
            .and_then(|uid| accounts.by_uid.get(uid))
            .ok_or(IdentityError::InvalidCredentials)?;

        let matches = verify_password(password, &account.password_hash)
            .map_err(|e| IdentityError::Internal(e.to_string()))?;
        if !matches {
            return Err(IdentityError::InvalidCredentials);
        }

        let id_token = generate_id_token(
            &account.uid,
            &account.email,
            account.email_verified,
            account.role.as_deref(),
            &self.config,
        )
        .map_err(|e| IdentityError::Internal(e.to_string()))?;

        Ok(IssuedToken {
            id_token,
            expires_in: self.config.token_expiry_mins * 60,
        })
    }

    async fn verify_email(&self, code: &str) -> Result<UserRecord, IdentityError> {
        let mut accounts = self.accounts.write().await;
        let uid = accounts
            .action_codes
            .remove(&hash_action_code(code.trim()))
            .ok_or(IdentityError::InvalidActionCode)?;
        let account = accounts
            .by_uid
            .get_mut(&uid)
            .ok_or(IdentityError::UserNotFound)?;
        account.email_verified = true;
        tracing::info!(uid = %uid, "Email verified");
        Ok(account.record())
    }

    async fn delete_user(&self, uid: &str) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .by_uid
            .remove(uid)
            .ok_or(IdentityError::UserNotFound)?;
        accounts.by_email.remove(&normalize_email(&account.email));
        accounts.action_codes.retain(|_, owner| owner != uid);
        tracing::info!(uid = %uid, "Identity account deleted");
        Ok(())
    }
}
