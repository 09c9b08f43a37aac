//! Repository for the `users` collection.

use careers_core::roles::Role;
use careers_core::types::DocId;
use serde_json::{json, Value};

use super::{fetch, fetch_all};
use crate::models::user::{ProfileData, User, COLLECTION};
use crate::store::{to_data, Query, StoreError, ID_FIELD};
use crate::DbPool;

/// Provides operations on user documents.
pub struct UserRepo;

impl UserRepo {
    /// Write the user document for a freshly registered account.
    pub async fn create(
        pool: &DbPool,
        uid: &str,
        email: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let user = User {
            id: uid.to_string(),
            email: email.to_string(),
            role,
            profile_data: ProfileData::default(),
            created_at: chrono::Utc::now(),
        };
        pool.set(COLLECTION, uid, to_data(&user)?).await?.decode()
    }

    pub async fn find_by_id(pool: &DbPool, uid: &str) -> Result<Option<User>, StoreError> {
        fetch(pool, COLLECTION, uid).await
    }

    /// Fetch several users at once. Unknown ids are skipped.
    pub async fn find_by_ids(pool: &DbPool, ids: &[DocId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<Value> = ids.iter().map(|id| json!(id)).collect();
        fetch_all(pool, COLLECTION, &Query::new().is_in(ID_FIELD, values)).await
    }

    pub async fn list_by_role(pool: &DbPool, role: Role) -> Result<Vec<User>, StoreError> {
        fetch_all(pool, COLLECTION, &Query::new().eq("role", role.as_str())).await
    }

    /// Replace the profile data, leaving the rest of the document intact.
    pub async fn update_profile(
        pool: &DbPool,
        uid: &str,
        profile: &ProfileData,
    ) -> Result<User, StoreError> {
        let patch = json!({ "profileData": serde_json::to_value(profile)? });
        pool.update(COLLECTION, uid, patch).await?.decode()
    }
}
