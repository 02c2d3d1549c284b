use crate::app_state::AppState;
use crate::ledger::AdjustmentInstruction;
use crate::services::audit_service::AuditService;
use payout_primitives::error::ApiError;
use payout_primitives::models::dtos::balance_dto::{
    AdjustmentRequest, AdjustmentResponse, BalanceRequestDto, BalanceRequestResponse,
};
use payout_primitives::models::entities::{BalanceRequestDecision, NewBalanceRequest};
use payout_primitives::utility::to_minor_units;
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Admin-driven credits and debits. Every mutation goes through the ledger's
/// atomic operations and leaves a before/after snapshot.
pub struct BalanceAdjustmentService;

impl BalanceAdjustmentService {
    pub async fn submit_balance_request(
        state: &AppState,
        user_id: Uuid,
        req: BalanceRequestDto,
    ) -> Result<BalanceRequestResponse, ApiError> {
        req.validate()?;

        let amount = positive_minor_units(req.amount)?;

        let user = state
            .ledger
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        if user.is_disabled {
            return Err(ApiError::Forbidden("Account is disabled".into()));
        }

        let request = state
            .ledger
            .create_balance_request(NewBalanceRequest {
                id: Uuid::new_v4(),
                user_id,
                amount,
                utr: req.utr.trim().to_string(),
            })
            .await?;

        info!(request_id = %request.id, user_id = %user_id, amount, "Balance request submitted");

        Ok(request.into())
    }

    pub async fn confirm_balance_request(
        state: &AppState,
        admin_id: Uuid,
        request_id: Uuid,
        remarks: Option<String>,
    ) -> Result<BalanceRequestResponse, ApiError> {
        Self::resolve(
            state,
            admin_id,
            request_id,
            BalanceRequestDecision::Confirm,
            remarks,
        )
        .await
    }

    pub async fn reject_balance_request(
        state: &AppState,
        admin_id: Uuid,
        request_id: Uuid,
        remarks: Option<String>,
    ) -> Result<BalanceRequestResponse, ApiError> {
        Self::resolve(
            state,
            admin_id,
            request_id,
            BalanceRequestDecision::Reject,
            remarks,
        )
        .await
    }

    async fn resolve(
        state: &AppState,
        admin_id: Uuid,
        request_id: Uuid,
        decision: BalanceRequestDecision,
        remarks: Option<String>,
    ) -> Result<BalanceRequestResponse, ApiError> {
        let resolved = state
            .ledger
            .resolve_balance_request(request_id, admin_id, decision, remarks)
            .await?;

        info!(
            request_id = %request_id,
            admin_id = %admin_id,
            status = %resolved.status,
            "Balance request resolved"
        );

        AuditService::log_event(
            state,
            Some(admin_id),
            "balance_request.resolved",
            Some("balance_request"),
            Some(&request_id.to_string()),
            json!({
                "status": resolved.status,
                "user_id": resolved.user_id,
                "amount": resolved.amount,
                "balance_before": resolved.balance_before,
                "balance_after": resolved.balance_after,
            }),
        )
        .await;

        Ok(resolved.into())
    }

    pub async fn adjust_balance(
        state: &AppState,
        admin_id: Uuid,
        user_id: Uuid,
        req: AdjustmentRequest,
    ) -> Result<AdjustmentResponse, ApiError> {
        req.validate()?;

        let amount = positive_minor_units(req.amount)?;

        let adjustment = state
            .ledger
            .apply_adjustment(AdjustmentInstruction {
                admin_id,
                user_id,
                kind: req.kind,
                amount,
                reason: req.reason.trim().to_string(),
            })
            .await?;

        info!(
            adjustment_id = %adjustment.id,
            user_id = %user_id,
            kind = %adjustment.kind,
            amount,
            "Balance adjusted"
        );

        AuditService::log_event(
            state,
            Some(admin_id),
            "balance.adjusted",
            Some("user"),
            Some(&user_id.to_string()),
            json!({
                "adjustment_id": adjustment.id,
                "kind": adjustment.kind,
                "amount": amount,
                "balance_before": adjustment.balance_before,
                "balance_after": adjustment.balance_after,
            }),
        )
        .await;

        Ok(adjustment.into())
    }
}

fn positive_minor_units(amount: rust_decimal::Decimal) -> Result<i64, ApiError> {
    let minor = to_minor_units(amount)?;
    if minor <= 0 {
        return Err(ApiError::InvalidRequest(
            "Amount must be greater than zero".into(),
        ));
    }
    Ok(minor)
}
