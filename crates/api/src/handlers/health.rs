use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use payout_core::AppState;
use payout_primitives::models::dtos::health_dto::HealthStatus;
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check endpoint",
    description = "Reports whether the service can reach its ledger database. \
                   This endpoint is **public** (no authentication required).",
    operation_id = "healthCheck",
    responses(
        ( status = 200, description = "Service is healthy and operational", body = HealthStatus),
        ( status = 503, description = "The ledger database is unreachable", body = HealthStatus),
    ),
    security(()),
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthStatus>) {
    let timestamp = Utc::now().to_rfc3339();

    match state.ledger.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok".to_string(),
                database: "up".to_string(),
                timestamp,
            }),
        ),
        Err(e) => {
            error!("Health check ledger ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "degraded".to_string(),
                    database: "down".to_string(),
                    timestamp,
                }),
            )
        }
    }
}
