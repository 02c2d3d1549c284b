use crate::app_state::AppState;
use crate::clients::{GatewayClient, GatewayResult, PayoutInstruction};
use crate::ledger::PayoutRecord;
use crate::services::audit_service::AuditService;
use crate::services::charge_service::ChargeResolver;
use chrono::Utc;
use payout_primitives::error::ApiError;
use payout_primitives::models::dtos::payout_dto::{PayoutRequest, PayoutResponse};
use payout_primitives::models::entities::{
    Destination, FailureKind, NewTransaction, Transaction, TransactionStatus,
};
use payout_primitives::utility::to_minor_units;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

pub struct PayoutService;

/// Everything the detached half of a payout needs, owned.
struct PayoutPlan {
    user_id: Uuid,
    gateway: Arc<dyn GatewayClient>,
    req: PayoutRequest,
    beneficiary_name: String,
    destination: Destination,
    amount: i64,
    charge: i64,
    total: i64,
}

impl PayoutService {
    /// Runs one payout through
    /// RECEIVED -> VALIDATED -> CHARGE_RESOLVED -> BALANCE_HELD -> GATEWAY_CALLED
    /// and persists the outcome. Idempotent per `transaction_id`.
    pub async fn submit_payout(
        state: &Arc<AppState>,
        user_id: Uuid,
        req: PayoutRequest,
    ) -> Result<PayoutResponse, ApiError> {
        req.validate()?;

        // 1. Idempotency
        if let Some(existing) = state.ledger.find_transaction_by_key(&req.transaction_id).await? {
            info!(transaction_id = %req.transaction_id, "Replaying stored payout");
            return Self::replay(user_id, existing);
        }

        // 2. Validate
        let amount = to_minor_units(req.amount)?;
        if amount <= 0 {
            return Err(ApiError::InvalidRequest(
                "Amount must be greater than zero".into(),
            ));
        }

        let beneficiary = state
            .ledger
            .find_beneficiary(req.beneficiary_id)
            .await?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| ApiError::InvalidRequest("Beneficiary not found".into()))?;

        let destination = beneficiary.destination(req.rail).ok_or_else(|| {
            ApiError::InvalidRequest(format!(
                "Beneficiary has no destination usable over {}",
                req.rail
            ))
        })?;

        // 3. Permissions
        let user = state
            .ledger
            .find_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        if user.is_disabled {
            return Err(ApiError::Forbidden("Account is disabled".into()));
        }
        if !user.can_use(req.rail) {
            return Err(ApiError::Forbidden(format!(
                "{} payouts are not enabled for this account",
                req.rail
            )));
        }
        if state.config.require_verified_beneficiary && !beneficiary.is_verified {
            return Err(ApiError::Forbidden("Beneficiary is not verified".into()));
        }

        // 4. Charge
        let rules = state.ledger.active_charge_rules().await?;
        let charge = ChargeResolver::new(rules).resolve(amount)?;
        let total = amount
            .checked_add(charge)
            .ok_or_else(|| ApiError::InvalidRequest("Amount is out of range".into()))?;

        let plan = PayoutPlan {
            user_id,
            gateway: state.gateways.for_rail(req.rail)?,
            req,
            beneficiary_name: beneficiary.name,
            destination,
            amount,
            charge,
            total,
        };

        // From the hold onwards the payout runs detached, so a dropped request
        // cannot stop between the gateway call and the ledger write.
        let state = Arc::clone(state);
        tokio::spawn(async move { Self::execute(&state, plan).await })
            .await
            .map_err(|e| {
                error!(
                    alert = "manual_reconciliation",
                    error = %e,
                    "Payout task panicked"
                );
                ApiError::Internal("Payout task aborted".into())
            })?
    }

    async fn execute(state: &AppState, plan: PayoutPlan) -> Result<PayoutResponse, ApiError> {
        let PayoutPlan {
            user_id,
            gateway,
            req,
            beneficiary_name,
            destination,
            amount,
            charge,
            total,
        } = plan;

        // 5. Balance hold
        if let Err(e) = state.ledger.reserve_funds(user_id, total).await {
            if matches!(e, ApiError::InsufficientBalance { .. }) {
                // a concurrent request with this key may have just landed
                if let Some(existing) =
                    state.ledger.find_transaction_by_key(&req.transaction_id).await?
                {
                    return Self::replay(user_id, existing);
                }
            }
            return Err(e);
        }

        // 6. Gateway, outside any ledger transaction
        let result = gateway
            .submit_payout(&PayoutInstruction {
                idempotency_key: &req.transaction_id,
                amount,
                beneficiary_name: &beneficiary_name,
                destination: &destination,
            })
            .await;

        // 7. Persist and resolve the hold
        let new_tx = Self::new_transaction(&req, user_id, amount, charge, &result);

        match state.ledger.record_payout(new_tx).await {
            Ok(PayoutRecord::Created(tx)) => {
                Self::log_outcome(&tx);
                Ok(PayoutResponse::from_transaction(&tx, false))
            }
            Ok(PayoutRecord::Existing(tx)) => {
                info!(
                    transaction_id = %req.transaction_id,
                    "Lost idempotency race, returning stored payout"
                );
                Self::replay(user_id, tx)
            }
            Ok(PayoutRecord::Unsettled(tx)) => Err(Self::unsettled(state, &tx, &result).await),
            Err(e) => Err(
                Self::persistence_failure(state, user_id, &req, total, &result, e).await,
            ),
        }
    }

    fn replay(user_id: Uuid, tx: Transaction) -> Result<PayoutResponse, ApiError> {
        if tx.user_id != user_id {
            return Err(ApiError::Forbidden(
                "Transaction id is already in use".into(),
            ));
        }
        Ok(PayoutResponse::from_transaction(&tx, true))
    }

    fn new_transaction(
        req: &PayoutRequest,
        user_id: Uuid,
        amount: i64,
        charge: i64,
        result: &GatewayResult,
    ) -> NewTransaction {
        let mut tx = NewTransaction {
            id: Uuid::new_v4(),
            user_id,
            beneficiary_id: req.beneficiary_id,
            rail: req.rail,
            amount,
            charge_amount: charge,
            transaction_id: req.transaction_id.clone(),
            reference_no: result.gateway_txn_ref().map(str::to_string),
            status: TransactionStatus::Pending,
            failure_kind: None,
            failure_code: None,
            failure_message: None,
            balance_applied: false,
            settled_at: None,
        };

        match result {
            GatewayResult::Success { .. } => {
                tx.status = TransactionStatus::Completed;
                tx.balance_applied = true;
                tx.settled_at = Some(Utc::now());
            }
            GatewayResult::Pending { .. } => {}
            GatewayResult::Failed {
                reason_code,
                message,
            } => {
                tx.status = TransactionStatus::Failed;
                tx.failure_kind = Some(FailureKind::GatewayRejected);
                tx.failure_code = Some(reason_code.clone());
                tx.failure_message = Some(message.clone());
                tx.settled_at = Some(Utc::now());
            }
            GatewayResult::TransportError { cause } => {
                tx.status = TransactionStatus::Failed;
                tx.failure_kind = Some(FailureKind::Transport);
                tx.failure_code = Some("TRANSPORT_ERROR".into());
                tx.failure_message = Some(cause.clone());
                tx.settled_at = Some(Utc::now());
            }
        }

        tx
    }

    /// The gateway accepted the payout and the row is stored under its key,
    /// but the debit is still owed. Reconciliation settles it later.
    async fn unsettled(state: &AppState, tx: &Transaction, result: &GatewayResult) -> ApiError {
        error!(
            alert = "manual_reconciliation",
            transaction_id = %tx.transaction_id,
            user_id = %tx.user_id,
            rail = ?tx.rail,
            gateway_result = %result,
            "Gateway accepted payout but the debit could not be applied"
        );

        AuditService::log_event(
            state,
            Some(tx.user_id),
            "payout.internal_inconsistency",
            Some("transaction"),
            Some(&tx.transaction_id),
            json!({
                "rail": tx.rail.to_string(),
                "amount": tx.amount,
                "gateway_result": result.to_string(),
                "recorded_status": tx.status.to_string(),
                "debit_owed": tx.total_debit(),
            }),
        )
        .await;

        ApiError::InternalInconsistency(format!(
            "Payout {} reached the gateway ({}) but the debit could not be applied; it stays PENDING for reconciliation",
            tx.transaction_id, result
        ))
    }

    fn log_outcome(tx: &Transaction) {
        match (tx.status, tx.failure_kind) {
            (TransactionStatus::Failed, Some(FailureKind::Transport)) => warn!(
                transaction_id = %tx.transaction_id,
                rail = ?tx.rail,
                "Payout outcome unknown after transport error"
            ),
            (status, _) => info!(
                transaction_id = %tx.transaction_id,
                rail = ?tx.rail,
                status = %status,
                amount = tx.amount,
                charge = tx.charge_amount,
                "Payout recorded"
            ),
        }
    }

    /// The gateway has already been called. Unless it definitively declined,
    /// money may have moved without a local record.
    async fn persistence_failure(
        state: &AppState,
        user_id: Uuid,
        req: &PayoutRequest,
        total: i64,
        result: &GatewayResult,
        cause: ApiError,
    ) -> ApiError {
        if matches!(result, GatewayResult::Failed { .. }) {
            error!(
                transaction_id = %req.transaction_id,
                error = %cause,
                "Failed to record declined payout"
            );
            if let Err(e) = state.ledger.release_funds(user_id, total).await {
                error!(user_id = %user_id, error = %e, "Failed to release payout hold");
            }
            return cause;
        }

        error!(
            alert = "manual_reconciliation",
            transaction_id = %req.transaction_id,
            user_id = %user_id,
            rail = ?req.rail,
            gateway_result = %result,
            error = %cause,
            "Gateway accepted payout but the ledger write failed"
        );

        AuditService::log_event(
            state,
            Some(user_id),
            "payout.internal_inconsistency",
            Some("transaction"),
            Some(&req.transaction_id),
            json!({
                "rail": req.rail.to_string(),
                "gateway_result": result.to_string(),
                "error": cause.to_string(),
                "funds_held": total,
            }),
        )
        .await;

        ApiError::InternalInconsistency(format!(
            "Payout {} reached the gateway ({}) but could not be recorded; flagged for manual reconciliation",
            req.transaction_id, result
        ))
    }
}
