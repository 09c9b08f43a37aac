//! Route definitions for `/api/company`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{jobs, notifications};
use crate::middleware::rbac::RequireCompany;
use crate::state::AppState;

/// Routes mounted at `/api/company`.
///
/// ```text
/// GET  /jobs                  -> list_jobs
/// POST /jobs                  -> create_job
/// PUT  /jobs/{id}/status      -> update_job_status
/// GET  /notifications         -> list
/// GET  /notifications/stream  -> stream (SSE)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/jobs/{id}/status", put(jobs::update_job_status))
        .route("/notifications", get(notifications::list::<RequireCompany>))
        .route(
            "/notifications/stream",
            get(notifications::stream::<RequireCompany>),
        )
}
