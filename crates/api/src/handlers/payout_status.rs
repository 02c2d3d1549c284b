use axum::{
    extract::{Extension, Path, State},
    Json,
};
use payout_core::services::transaction_service::TransactionService;
use payout_core::{AppState, Claims};
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::transaction_dto::TransactionResponse;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/payouts/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Idempotency key the payout was submitted with")
    ),
    responses(
        (status = 200, description = "Current payout state", body = TransactionResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "No payout with this key for the caller", body = ApiErrorResponse),
        (status = 500, description = "Internal server error", body = ApiErrorResponse)
    ),
    security(("bearerAuth" = [])),
    tag = "Payouts"
)]
pub async fn get_payout_status(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let tx = TransactionService::get_transaction_status(&state, &claims, &transaction_id).await?;

    Ok(Json(tx))
}
