pub mod auth;
pub mod company;
pub mod health;
pub mod institution;
pub mod student;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the route tree below the root.
///
/// Route hierarchy:
///
/// ```text
/// /health                                   service and store health
///
/// /register                                 create account (public)
/// /login                                    exchange ID token for profile (public)
/// /auth/token                               sign in with email/password (public)
/// /auth/verify-email                        confirm email (public)
///
/// /ws                                       chat WebSocket (?token=)
///
/// /api/institution/...                      institution role only
/// /api/student/...                          student role only
/// /api/company/...                          company role only
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .route("/ws", get(ws::ws_handler))
        .nest("/api/institution", institution::router())
        .nest("/api/student", student::router())
        .nest("/api/company", company::router())
}
