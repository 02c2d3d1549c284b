use axum::extract::{Path, State};
use axum::{Extension, Json};
use payout_core::services::balance_adjustment_service::BalanceAdjustmentService;
use payout_core::{AppState, Claims};
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::balance_dto::{AdjustmentRequest, AdjustmentResponse};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/admin/users/{user_id}/adjustments",
    tag = "Admin",
    summary = "Credit or debit a user's balance",
    description = "Applies an ADDITION or DEDUCTION atomically and records the balance before and after. \
                   A deduction never takes the balance below zero.",
    operation_id = "adjustBalance",
    params(("user_id" = Uuid, Path, description = "User whose balance is adjusted")),
    request_body = AdjustmentRequest,
    responses(
        ( status = 200, description = "Adjustment applied", body = AdjustmentResponse),
        ( status = 400, description = "Invalid amount or reason", body = ApiErrorResponse),
        ( status = 402, description = "Deduction exceeds the balance", body = ApiErrorResponse),
        ( status = 403, description = "Admin privileges required", body = ApiErrorResponse),
        ( status = 404, description = "User not found", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn adjust_balance(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<AdjustmentRequest>,
) -> Result<Json<AdjustmentResponse>, ApiError> {
    let admin_id = claims.user_id()?;

    let res = BalanceAdjustmentService::adjust_balance(&state, admin_id, user_id, req).await?;

    Ok(Json(res))
}
