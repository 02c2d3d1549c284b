use axum::extract::State;
use axum::Json;
use payout_core::services::reconciliation_service::ReconciliationService;
use payout_core::AppState;
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::reconciliation_dto::ReconciliationSummary;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/admin/reconciliation/run",
    tag = "Admin",
    summary = "Run one reconciliation pass now",
    description = "Takes the same lock as the scheduled job. When another instance holds it the pass is \
                   skipped and `skipped = true` is returned.",
    operation_id = "runReconciliation",
    responses(
        ( status = 200, description = "Pass finished or skipped", body = ReconciliationSummary),
        ( status = 403, description = "Admin privileges required", body = ApiErrorResponse),
        ( status = 500, description = "Pass aborted", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn run_reconciliation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReconciliationSummary>, ApiError> {
    let summary = ReconciliationService::run_pass(&state).await?;

    Ok(Json(summary))
}
