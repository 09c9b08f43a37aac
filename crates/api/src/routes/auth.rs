//! Public authentication routes, mounted at the root.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST /register            -> register
/// POST /login               -> login
/// POST /auth/token          -> issue_token
/// GET  /auth/verify-email   -> verify_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/auth/token", post(auth::issue_token))
        .route("/auth/verify-email", get(auth::verify_email))
}
