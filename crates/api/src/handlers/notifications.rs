//! Notification endpoints shared by every role.
//!
//! The handlers are generic over a [`RoleGuard`] and mounted once per
//! role, so each dashboard only reaches its own `/api/{role}/...` paths.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use careers_db::models::notification::Notification;
use careers_db::repositories::NotificationRepo;
use futures::stream::Stream;
use serde::Serialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::error::AppResult;
use crate::middleware::rbac::RoleGuard;
use crate::notifications::Notice;
use crate::query::LimitParams;
use crate::response::Envelope;
use crate::state::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);
const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Serialize)]
pub struct NotificationsPayload {
    pub notifications: Vec<Notification>,
}

fn notice_event(notice: &Notice) -> Event {
    // Notice is plain strings; serialization cannot fail.
    Event::default()
        .json_data(notice)
        .unwrap_or_else(|_| Event::default().comment("unserializable notice"))
}

/// GET /api/{role}/notifications/stream
///
/// Server-sent events carrying `{type, title, message}`. A stream that
/// falls behind skips the notices it missed rather than closing. Every
/// stream ends when the server begins shutting down.
pub async fn stream<G: RoleGuard>(
    guard: G,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user = guard.user();
    let rx = state.notification_hub.subscribe(&user.uid).await;
    tracing::debug!(uid = %user.uid, role = %G::ROLE.as_str(), "Notification stream opened");

    let events = BroadcastStream::new(rx).filter_map(|item| match item {
        Ok(notice) => Some(Ok(notice_event(&notice))),
        Err(lagged) => {
            tracing::warn!(error = %lagged, "Notification stream lagged");
            None
        }
    });
    let events = futures::StreamExt::take_until(events, state.shutdown.clone().cancelled_owned());

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

/// GET /api/{role}/notifications?limit= -- newest first.
pub async fn list<G: RoleGuard>(
    guard: G,
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<Envelope<NotificationsPayload>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let notifications =
        NotificationRepo::list_for_user(&state.pool, &guard.user().uid, limit).await?;
    Ok(Json(Envelope::ok(NotificationsPayload { notifications })))
}
