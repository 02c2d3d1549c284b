use crate::app_state::AppState;
use crate::services::audit_service::AuditService;
use payout_primitives::error::ApiError;
use payout_primitives::models::dtos::beneficiary_dto::BeneficiaryResponse;
use payout_primitives::models::entities::Beneficiary;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

pub struct BeneficiaryService;

impl BeneficiaryService {
    /// Name-match check against the rail provider. Verification is one-way:
    /// an already verified beneficiary is returned untouched.
    pub async fn verify(
        state: &AppState,
        user_id: Uuid,
        beneficiary_id: Uuid,
    ) -> Result<BeneficiaryResponse, ApiError> {
        let beneficiary = Self::owned(state, user_id, beneficiary_id).await?;

        if beneficiary.is_verified {
            return Ok(beneficiary.into());
        }

        let rail = beneficiary.primary_rail().ok_or_else(|| {
            ApiError::InvalidRequest("Beneficiary has no payout destination".into())
        })?;
        let destination = beneficiary
            .destination(rail)
            .ok_or_else(|| ApiError::InvalidRequest("Beneficiary has no payout destination".into()))?;

        let registered_name = state
            .gateways
            .for_rail(rail)?
            .resolve_account(&destination)
            .await?;

        if !names_match(&beneficiary.name, &registered_name) {
            warn!(
                beneficiary_id = %beneficiary_id,
                rail = %rail,
                "Beneficiary name does not match the provider record"
            );
            return Err(ApiError::InvalidRequest(format!(
                "Name mismatch: provider has '{}'",
                registered_name
            )));
        }

        let verified = state
            .ledger
            .set_beneficiary_verification(beneficiary_id, true, Some(registered_name))
            .await?;

        info!(beneficiary_id = %beneficiary_id, rail = %rail, "Beneficiary verified");

        AuditService::log_event(
            state,
            Some(user_id),
            "beneficiary.verified",
            Some("beneficiary"),
            Some(&beneficiary_id.to_string()),
            json!({ "rail": rail, "verified_name": verified.verified_name }),
        )
        .await;

        Ok(verified.into())
    }

    /// Admin reset back to unverified.
    pub async fn invalidate(
        state: &AppState,
        admin_id: Uuid,
        beneficiary_id: Uuid,
        reason: &str,
    ) -> Result<BeneficiaryResponse, ApiError> {
        state
            .ledger
            .find_beneficiary(beneficiary_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Beneficiary not found".into()))?;

        let invalidated = state
            .ledger
            .set_beneficiary_verification(beneficiary_id, false, None)
            .await?;

        info!(beneficiary_id = %beneficiary_id, admin_id = %admin_id, "Beneficiary invalidated");

        AuditService::log_event(
            state,
            Some(admin_id),
            "beneficiary.invalidated",
            Some("beneficiary"),
            Some(&beneficiary_id.to_string()),
            json!({ "reason": reason }),
        )
        .await;

        Ok(invalidated.into())
    }

    async fn owned(
        state: &AppState,
        user_id: Uuid,
        beneficiary_id: Uuid,
    ) -> Result<Beneficiary, ApiError> {
        state
            .ledger
            .find_beneficiary(beneficiary_id)
            .await?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| ApiError::NotFound("Beneficiary not found".into()))
    }
}

/// Case-, punctuation- and whitespace-insensitive comparison of holder names.
pub fn names_match(expected: &str, actual: &str) -> bool {
    fn normalize(name: &str) -> String {
        name.split_whitespace()
            .map(|part| {
                part.chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect::<String>()
            })
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    let expected = normalize(expected);
    !expected.is_empty() && expected == normalize(actual)
}
