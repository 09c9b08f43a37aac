//! Repository for the `activities` collection.

use careers_core::types::DocId;

use super::{fetch_all, insert};
use crate::models::activity::{Activity, NewActivity, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

/// Maximum number of feed entries returned.
pub const FEED_LIMIT: usize = 20;

pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn create(pool: &DbPool, input: NewActivity) -> Result<Activity, StoreError> {
        let activity = Activity {
            id: DocId::new(),
            user_id: input.user_id,
            activity_type: input.activity_type,
            title: input.title,
            description: input.description,
            date: chrono::Utc::now(),
            action_url: input.action_url,
            action_text: input.action_text,
        };
        insert(pool, COLLECTION, &activity).await
    }

    /// The user's most recent activity, newest first, at most [`FEED_LIMIT`].
    pub async fn list_for_user(pool: &DbPool, user_id: &str) -> Result<Vec<Activity>, StoreError> {
        let query = Query::new()
            .eq("userId", user_id)
            .order_by("date", Direction::Desc)
            .limit(FEED_LIMIT);
        fetch_all(pool, COLLECTION, &query).await
    }
}
