//! Health Routes
//!
//! Home and health check endpoints for monitoring and probes.
//!
//! - GET / - Plain readiness text, used to check the service is up
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (dataset loaded)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /
///
/// Home handler, used to check the application is running.
pub async fn home() -> &'static str {
    "Ready"
}

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once the dataset is loaded. The engine is built before the
/// server binds, so this only reports 503 for an empty dataset.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.engine.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /health
///
/// Full health status with the loaded record count.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.engine.is_empty() {
        "empty"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        records: state.engine.len(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
