use axum::extract::State;
use axum::{routing::get, Json, Router};
use careers_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    /// `"OK"`, or `"DEGRADED"` when the store is unreachable.
    pub status: &'static str,
    pub timestamp: Timestamp,
    /// Document store connectivity: `"Connected"` or `"Unavailable"`.
    pub firebase: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET /health -- returns service and document store health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = match careers_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Document store health check failed");
            false
        }
    };

    Json(HealthResponse {
        success: true,
        status: if store_healthy { "OK" } else { "DEGRADED" },
        timestamp: chrono::Utc::now(),
        firebase: if store_healthy { "Connected" } else { "Unavailable" },
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Mount health check routes at the root.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
