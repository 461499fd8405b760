use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;

use crate::models::{HealthResponse, LimitsInfo};
use crate::state::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let metrics = state.limiter.metrics();

    let status = if metrics.available_permits > 0 {
        "healthy"
    } else {
        "busy"
    };

    info!(
        status = status,
        available_permits = metrics.available_permits,
        "Health check completed"
    );

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        uptime_seconds: Some(state.started_at.elapsed().as_secs()),
        limits: LimitsInfo {
            max_file_size_mb: state.config.max_file_size_mb,
            max_concurrent_requests: metrics.max_requests,
            available_permits: metrics.available_permits,
            total_requests: metrics.total_requests,
            rejected_requests: metrics.rejected_requests,
        },
    })
}

/// Readiness check endpoint
pub async fn ready_handler() -> StatusCode {
    StatusCode::OK
}
