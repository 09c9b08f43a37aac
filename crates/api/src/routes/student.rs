//! Route definitions for `/api/student`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{campus_events, notifications, student};
use crate::middleware::rbac::RequireStudent;
use crate::state::AppState;

/// Routes mounted at `/api/student`.
///
/// ```text
/// GET  /profile                     -> get_profile
/// PUT  /profile                     -> update_profile (multipart)
/// GET  /applications                -> list_applications
/// POST /applications                -> apply
/// GET  /applications/stats          -> application_stats
/// GET  /recommendations/courses     -> recommend_courses
/// GET  /recommendations/jobs        -> recommend_jobs
/// GET  /activity                    -> activity
/// GET  /events                      -> list_upcoming
/// POST /events/{id}/rsvp            -> rsvp
/// GET  /notifications               -> list
/// GET  /notifications/stream        -> stream (SSE)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(student::get_profile).put(student::update_profile),
        )
        .route(
            "/applications",
            get(student::list_applications).post(student::apply),
        )
        .route("/applications/stats", get(student::application_stats))
        .route("/recommendations/courses", get(student::recommend_courses))
        .route("/recommendations/jobs", get(student::recommend_jobs))
        .route("/activity", get(student::activity))
        .route("/events", get(campus_events::list_upcoming))
        .route("/events/{id}/rsvp", post(campus_events::rsvp))
        .route("/notifications", get(notifications::list::<RequireStudent>))
        .route(
            "/notifications/stream",
            get(notifications::stream::<RequireStudent>),
        )
}
