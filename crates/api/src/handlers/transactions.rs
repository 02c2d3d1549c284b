use axum::extract::{Query, State};
use axum::{Extension, Json};
use payout_core::services::transaction_service::TransactionService;
use payout_core::{AppState, Claims};
use payout_primitives::error::ApiError;
use payout_primitives::models::dtos::transaction_dto::{TransactionsQuery, TransactionsResponse};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionsQuery),
    responses(
        (status = 200, body = TransactionsResponse),
        (status = 401),
        (status = 500)
    ),
    tag = "Transactions",
    security(("bearerAuth" = [])),
)]
pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let res = TransactionService::recent_transactions(&state, &claims, query.limit).await?;

    Ok(Json(res))
}
