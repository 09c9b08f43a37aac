//! Activity-feed persistence service.
//!
//! [`ActivityRecorder`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes activity entries for the users an event concerns. It runs as
//! a long-lived background task and shuts down when the bus is dropped.

use careers_db::models::activity::NewActivity;
use careers_db::repositories::ActivityRepo;
use careers_db::{DbPool, StoreError};
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::kinds;

/// Who an activity entry is written for.
enum Audience {
    Actor,
    Recipients,
}

/// Feed placement for one event type.
struct FeedRule {
    audience: Audience,
    activity_type: &'static str,
    action: Option<(&'static str, &'static str)>,
}

fn rule_for(event_type: &str) -> Option<FeedRule> {
    let rule = match event_type {
        kinds::APPLICATION_SUBMITTED => FeedRule {
            audience: Audience::Actor,
            activity_type: "application",
            action: Some(("/student/applications", "View application")),
        },
        kinds::APPLICATION_REVIEWED => FeedRule {
            audience: Audience::Recipients,
            activity_type: "application",
            action: Some(("/student/applications", "View status")),
        },
        kinds::ADMISSION_UPDATED => FeedRule {
            audience: Audience::Recipients,
            activity_type: "admission",
            action: None,
        },
        kinds::BROADCAST_SENT => FeedRule {
            audience: Audience::Recipients,
            activity_type: "message",
            action: None,
        },
        kinds::EVENT_RSVP => FeedRule {
            audience: Audience::Actor,
            activity_type: "event",
            action: Some(("/student/events", "View events")),
        },
        kinds::PROFILE_UPDATED => FeedRule {
            audience: Audience::Actor,
            activity_type: "profile",
            action: Some(("/student/profile", "View profile")),
        },
        _ => return None,
    };
    Some(rule)
}

/// Activity entries an event produces. Empty for events that do not
/// appear in anyone's feed.
pub fn activities_for(event: &PlatformEvent) -> Vec<NewActivity> {
    let Some(rule) = rule_for(&event.event_type) else {
        return Vec::new();
    };

    let users: Vec<String> = match rule.audience {
        Audience::Actor => event.actor_user_id.iter().cloned().collect(),
        Audience::Recipients => event.recipients.clone(),
    };

    users
        .into_iter()
        .map(|user_id| NewActivity {
            user_id,
            activity_type: rule.activity_type.to_string(),
            title: event.title.clone(),
            description: event.message.clone(),
            action_url: rule.action.map(|(url, _)| url.to_string()),
            action_text: rule.action.map(|(_, text)| text.to_string()),
        })
        .collect()
}

/// Background service that records activity-feed entries.
pub struct ActivityRecorder;

impl ActivityRecorder {
    /// Run the recording loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::record(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to record activity"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Activity recorder lagged, some events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, activity recorder shutting down");
                    break;
                }
            }
        }
    }

    /// Write the activity entries for a single event.
    pub async fn record(pool: &DbPool, event: &PlatformEvent) -> Result<usize, StoreError> {
        let entries = activities_for(event);
        let count = entries.len();
        for entry in entries {
            ActivityRepo::create(pool, entry).await?;
        }
        Ok(count)
    }
}
