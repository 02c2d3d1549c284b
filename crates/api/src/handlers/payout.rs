use axum::extract::State;
use axum::{Extension, Json};
use payout_core::services::payout_service::PayoutService;
use payout_core::{AppState, Claims};
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::payout_dto::{PayoutRequest, PayoutResponse};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/payouts",
    tag = "Payouts",
    summary = "Submit a payout to a beneficiary",
    description = "Validates the request, resolves the flat charge for the amount, checks the balance \
                   and calls the gateway for the chosen rail. The `transaction_id` is the idempotency key: \
                   resubmitting it returns the stored result with `duplicate = true` and never calls the gateway again. \
                   The balance is debited (amount + charge) only once the payout is COMPLETED. \
                   When `outcome_unknown` is true the gateway never answered; query the status endpoint \
                   instead of retrying with a new key.",
    operation_id = "submitPayout",
    request_body(content = PayoutRequest, description = "Beneficiary, amount in rupees, rail and idempotency key"),
    responses(
        ( status = 200, description = "Payout processed (or replayed)", body = PayoutResponse),
        ( status = 400, description = "Invalid amount, key or beneficiary", body = ApiErrorResponse),
        ( status = 401, description = "Missing or invalid token", body = ApiErrorResponse),
        ( status = 402, description = "Balance does not cover amount + charge", body = ApiErrorResponse),
        ( status = 403, description = "Rail not enabled, account disabled, unverified beneficiary or key owned by another user", body = ApiErrorResponse),
        ( status = 422, description = "Amount outside every charge band", body = ApiErrorResponse),
        ( status = 500, description = "Charge rules inconsistent, or the gateway accepted the payout but it could not be recorded", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn submit_payout(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PayoutRequest>,
) -> Result<Json<PayoutResponse>, ApiError> {
    let user_id = claims.user_id()?;

    let res = PayoutService::submit_payout(&state, user_id, req).await?;

    Ok(Json(res))
}
