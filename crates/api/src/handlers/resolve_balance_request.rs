use axum::extract::{Path, State};
use axum::{Extension, Json};
use payout_core::services::balance_adjustment_service::BalanceAdjustmentService;
use payout_core::{AppState, Claims};
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::balance_dto::{
    BalanceRequestDecisionDto, BalanceRequestResponse,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/admin/balance_requests/{request_id}/confirm",
    tag = "Admin",
    summary = "Confirm a balance request and credit the user",
    operation_id = "confirmBalanceRequest",
    params(("request_id" = Uuid, Path, description = "Balance request id")),
    request_body = BalanceRequestDecisionDto,
    responses(
        ( status = 200, description = "Request confirmed, balance credited", body = BalanceRequestResponse),
        ( status = 400, description = "Request already resolved", body = ApiErrorResponse),
        ( status = 403, description = "Admin privileges required", body = ApiErrorResponse),
        ( status = 404, description = "Request not found", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn confirm_balance_request(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<BalanceRequestDecisionDto>,
) -> Result<Json<BalanceRequestResponse>, ApiError> {
    req.validate()?;
    let admin_id = claims.user_id()?;

    let res =
        BalanceAdjustmentService::confirm_balance_request(&state, admin_id, request_id, req.remarks)
            .await?;

    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/api/admin/balance_requests/{request_id}/reject",
    tag = "Admin",
    summary = "Reject a balance request",
    operation_id = "rejectBalanceRequest",
    params(("request_id" = Uuid, Path, description = "Balance request id")),
    request_body = BalanceRequestDecisionDto,
    responses(
        ( status = 200, description = "Request rejected, balance untouched", body = BalanceRequestResponse),
        ( status = 400, description = "Request already resolved", body = ApiErrorResponse),
        ( status = 403, description = "Admin privileges required", body = ApiErrorResponse),
        ( status = 404, description = "Request not found", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn reject_balance_request(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(request_id): Path<Uuid>,
    Json(req): Json<BalanceRequestDecisionDto>,
) -> Result<Json<BalanceRequestResponse>, ApiError> {
    req.validate()?;
    let admin_id = claims.user_id()?;

    let res =
        BalanceAdjustmentService::reject_balance_request(&state, admin_id, request_id, req.remarks)
            .await?;

    Ok(Json(res))
}
