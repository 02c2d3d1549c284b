use axum::extract::{Path, State};
use axum::{Extension, Json};
use payout_core::services::beneficiary_service::BeneficiaryService;
use payout_core::{AppState, Claims};
use payout_primitives::error::{ApiError, ApiErrorResponse};
use payout_primitives::models::dtos::beneficiary_dto::BeneficiaryResponse;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/beneficiaries/{beneficiary_id}/verify",
    tag = "Beneficiaries",
    summary = "Verify a beneficiary against the rail provider",
    description = "Looks up the registered holder name for the beneficiary's bank account (or VPA) \
                   and marks it verified when the name matches. Already verified beneficiaries are returned unchanged.",
    operation_id = "verifyBeneficiary",
    params(
        ("beneficiary_id" = Uuid, Path, description = "Beneficiary owned by the caller")
    ),
    responses(
        ( status = 200, description = "Beneficiary verified", body = BeneficiaryResponse),
        ( status = 400, description = "Name mismatch or no usable destination", body = ApiErrorResponse),
        ( status = 401, description = "Unauthorized", body = ApiErrorResponse),
        ( status = 404, description = "Beneficiary not found", body = ApiErrorResponse),
        ( status = 502, description = "Provider rejected the lookup", body = ApiErrorResponse),
        ( status = 504, description = "Provider unreachable", body = ApiErrorResponse),
    ),
    security(("bearerAuth" = [])),
)]
pub async fn verify_beneficiary(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(beneficiary_id): Path<Uuid>,
) -> Result<Json<BeneficiaryResponse>, ApiError> {
    let user_id = claims.user_id()?;

    let res = BeneficiaryService::verify(&state, user_id, beneficiary_id).await?;

    Ok(Json(res))
}
