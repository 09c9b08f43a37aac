//! Repository for the `notifications` collection.

use careers_core::types::DocId;

use super::{fetch_all, insert};
use crate::models::notification::{Notification, COLLECTION};
use crate::store::{Direction, Query, StoreError};
use crate::DbPool;

/// Provides operations on stored notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Store an unread notification for a user.
    pub async fn create(
        pool: &DbPool,
        user_id: &str,
        notification_type: &str,
        title: &str,
        message: &str,
    ) -> Result<Notification, StoreError> {
        let notification = Notification {
            id: DocId::new(),
            user_id: user_id.to_string(),
            notification_type: notification_type.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            created_at: chrono::Utc::now(),
            read: false,
        };
        insert(pool, COLLECTION, &notification).await
    }

    /// Most recent notifications for a user, newest first.
    pub async fn list_for_user(
        pool: &DbPool,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, StoreError> {
        let query = Query::new()
            .eq("userId", user_id)
            .order_by("createdAt", Direction::Desc)
            .limit(limit);
        fetch_all(pool, COLLECTION, &query).await
    }
}
