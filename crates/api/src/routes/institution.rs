//! Route definitions for `/api/institution`.
//!
//! Every handler takes [`RequireInstitution`](crate::middleware::rbac::RequireInstitution).

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{
    admissions, applications, broadcast, campus_events, courses, notifications, students,
};
use crate::middleware::rbac::RequireInstitution;
use crate::state::AppState;

/// Routes mounted at `/api/institution`.
///
/// ```text
/// GET  /faculties                         -> list_faculties
/// POST /faculties                         -> create_faculty
///
/// GET  /courses                           -> list_courses (?search, faculty, status)
/// POST /courses                           -> create_course
/// GET  /courses/{id}                      -> get_course
/// PUT  /courses/{id}                      -> update_course
/// PUT  /courses/{id}/status               -> update_course_status
///
/// GET  /applications                      -> list_applications
/// GET  /applications/export               -> export_applications (CSV)
/// GET  /applications/{id}                 -> get_application
/// GET  /applications/{id}/documents       -> get_documents
/// PUT  /applications/{id}/review          -> review_application
///
/// GET  /students                          -> list_students
/// GET  /students/{id}                     -> get_student
/// GET  /chat/{student_id}/history         -> chat_history
///
/// GET  /admissions/stats                  -> stats
/// GET  /admissions/trends                 -> trends (?period)
/// GET  /admissions/distribution           -> distribution
/// GET  /admissions/recent                 -> recent
/// GET  /admissions/export                 -> export (CSV)
/// POST /admissions/report                 -> report
/// PUT  /admissions/{id}/enrollment        -> update_enrollment
///
/// POST /broadcast                         -> send_broadcast
/// POST /events                            -> create_event
///
/// GET  /notifications                     -> list
/// GET  /notifications/stream              -> stream (SSE)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Faculties and courses
        .route(
            "/faculties",
            get(courses::list_faculties).post(courses::create_faculty),
        )
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/{id}",
            get(courses::get_course).put(courses::update_course),
        )
        .route("/courses/{id}/status", put(courses::update_course_status))
        // Applications
        .route("/applications", get(applications::list_applications))
        .route(
            "/applications/export",
            get(applications::export_applications),
        )
        .route("/applications/{id}", get(applications::get_application))
        .route(
            "/applications/{id}/documents",
            get(applications::get_documents),
        )
        .route(
            "/applications/{id}/review",
            put(applications::review_application),
        )
        // Students
        .route("/students", get(students::list_students))
        .route("/students/{id}", get(students::get_student))
        .route("/chat/{student_id}/history", get(students::chat_history))
        // Admissions
        .route("/admissions/stats", get(admissions::stats))
        .route("/admissions/trends", get(admissions::trends))
        .route("/admissions/distribution", get(admissions::distribution))
        .route("/admissions/recent", get(admissions::recent))
        .route("/admissions/export", get(admissions::export))
        .route("/admissions/report", post(admissions::report))
        .route(
            "/admissions/{id}/enrollment",
            put(admissions::update_enrollment),
        )
        // Outreach
        .route("/broadcast", post(broadcast::send_broadcast))
        .route("/events", post(campus_events::create_event))
        // Notifications
        .route(
            "/notifications",
            get(notifications::list::<RequireInstitution>),
        )
        .route(
            "/notifications/stream",
            get(notifications::stream::<RequireInstitution>),
        )
}
