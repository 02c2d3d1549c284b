use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use payout_core::services::balance_adjustment_service::BalanceAdjustmentService;
use payout_core::{AppState, Claims};
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::balance_dto::{BalanceRequestDto, BalanceRequestResponse};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/balance_requests",
    tag = "Balance",
    summary = "Claim a bank transfer as a balance top-up",
    description = "Records a NEW balance request for the given UTR. Nothing is credited until an admin confirms it. \
                   A UTR can only be claimed once.",
    operation_id = "submitBalanceRequest",
    request_body = BalanceRequestDto,
    responses(
        ( status = 201, description = "Request recorded", body = BalanceRequestResponse),
        ( status = 400, description = "Invalid amount or UTR already claimed", body = ApiErrorResponse),
        ( status = 401, description = "Unauthorized", body = ApiErrorResponse),
        ( status = 403, description = "Account disabled", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn submit_balance_request(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BalanceRequestDto>,
) -> Result<(StatusCode, Json<BalanceRequestResponse>), ApiError> {
    let user_id = claims.user_id()?;

    let res = BalanceAdjustmentService::submit_balance_request(&state, user_id, req).await?;

    Ok((StatusCode::CREATED, Json(res)))
}
