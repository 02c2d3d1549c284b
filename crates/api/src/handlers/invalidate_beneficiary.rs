use axum::extract::{Path, State};
use axum::{Extension, Json};
use payout_core::services::beneficiary_service::BeneficiaryService;
use payout_core::{AppState, Claims};
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::beneficiary_dto::{
    BeneficiaryResponse, InvalidateBeneficiaryRequest,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/admin/beneficiaries/{beneficiary_id}/invalidate",
    tag = "Admin",
    summary = "Reset a beneficiary to unverified",
    operation_id = "invalidateBeneficiary",
    params(("beneficiary_id" = Uuid, Path, description = "Beneficiary id")),
    request_body = InvalidateBeneficiaryRequest,
    responses(
        ( status = 200, description = "Beneficiary invalidated", body = BeneficiaryResponse),
        ( status = 403, description = "Admin privileges required", body = ApiErrorResponse),
        ( status = 404, description = "Beneficiary not found", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn invalidate_beneficiary(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(beneficiary_id): Path<Uuid>,
    Json(req): Json<InvalidateBeneficiaryRequest>,
) -> Result<Json<BeneficiaryResponse>, ApiError> {
    req.validate()?;
    let admin_id = claims.user_id()?;

    let res = BeneficiaryService::invalidate(&state, admin_id, beneficiary_id, &req.reason).await?;

    Ok(Json(res))
}
