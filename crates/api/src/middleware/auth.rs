//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use careers_core::error::CoreError;
use careers_core::roles::Role;
use careers_core::types::DocId;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated principal extracted from a verified ID token.
///
/// The token is read from `Authorization: Bearer <token>`, or from a
/// `token` query parameter for clients (`EventSource`, `WebSocket`) that
/// cannot set headers. Rejection happens before any document-store access.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(uid = %user.uid, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: DocId,
    pub email: String,
    pub email_verified: bool,
    /// The `role` claim. `None` when absent or not a known role.
    pub role: Option<Role>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "No authorization token provided".into(),
            ))
        })?;

        let decoded = state
            .identity
            .verify_id_token(&token)
            .await
            .map_err(|e| AppError::InvalidToken(e.to_string()))?;

        Ok(AuthUser {
            uid: decoded.uid,
            email: decoded.email,
            email_verified: decoded.email_verified,
            role: decoded.role.and_then(|r| r.parse().ok()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pull the raw token from the `Authorization` header or `?token=`.
fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
}
