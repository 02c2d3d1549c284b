use crate::app_state::AppState;
use crate::clients::{GatewayClient, GatewayResult, StatusLookup};
use crate::ledger::Settlement;
use crate::services::audit_service::AuditService;
use chrono::{DateTime, Utc};
use payout_primitives::error::ApiError;
use payout_primitives::models::app_state::ReconciliationInfo;
use payout_primitives::models::dtos::reconciliation_dto::ReconciliationSummary;
use payout_primitives::models::entities::{Transaction, TransactionStatus};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const RECONCILIATION_JOB: &str = "payout_reconciliation";

/// Capped exponential backoff for status checks that hit transport errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(info: &ReconciliationInfo) -> Self {
        Self {
            max_attempts: info.max_attempts.max(1),
            initial_delay_ms: info.backoff_ms,
            max_delay_ms: info.backoff_ms.saturating_mul(16),
        }
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateOutcome {
    Completed,
    Failed,
    StillPending,
    AlreadySettled,
    Errored,
}

pub struct ReconciliationService;

impl ReconciliationService {
    /// One self-guarding pass over stuck PENDING payouts. Safe to call at any
    /// frequency from any number of instances: only the lock holder works.
    pub async fn run_pass(state: &Arc<AppState>) -> Result<ReconciliationSummary, ApiError> {
        let cfg = &state.config.reconciliation_details;
        let now = Utc::now();
        let holder = format!("{}/{}", cfg.instance_id, Uuid::new_v4().simple());

        if !state
            .ledger
            .try_acquire_lock(RECONCILIATION_JOB, &holder, now, cfg.lock_timeout())
            .await?
        {
            info!(job = RECONCILIATION_JOB, "Lock held elsewhere, skipping pass");
            return Ok(ReconciliationSummary::skipped());
        }

        info!(job = RECONCILIATION_JOB, holder = %holder, "Reconciliation pass started");

        // A panic inside the worker surfaces as a JoinError, so the release
        // below runs on every path.
        let worker = Arc::clone(state);
        let worker_holder = holder.clone();
        let outcome = tokio::spawn(async move {
            Self::process_candidates(&worker, &worker_holder, now).await
        })
        .await;

        if let Err(e) = state.ledger.release_lock(RECONCILIATION_JOB, &holder).await {
            error!(
                job = RECONCILIATION_JOB,
                holder = %holder,
                error = %e,
                "Failed to release lock; it will expire after the lock timeout"
            );
        }

        let summary = match outcome {
            Ok(result) => result?,
            Err(join_error) => {
                error!(error = %join_error, "Reconciliation worker aborted");
                return Err(ApiError::Internal(format!(
                    "Reconciliation pass aborted: {}",
                    join_error
                )));
            }
        };

        info!(
            processed = summary.processed,
            completed = summary.completed,
            failed = summary.failed,
            still_pending = summary.still_pending,
            errored = summary.errored,
            "Reconciliation pass finished"
        );

        AuditService::log_event(
            state,
            None,
            "reconciliation.pass",
            Some("job"),
            Some(RECONCILIATION_JOB),
            json!({
                "holder": holder,
                "processed": summary.processed,
                "completed": summary.completed,
                "failed": summary.failed,
                "still_pending": summary.still_pending,
                "errored": summary.errored,
            }),
        )
        .await;

        Ok(summary)
    }

    async fn process_candidates(
        state: &AppState,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<ReconciliationSummary, ApiError> {
        let cfg = &state.config.reconciliation_details;
        let policy = RetryPolicy::from_config(cfg);

        let candidates = state
            .ledger
            .pending_transactions(now - cfg.window(), now - cfg.min_age(), cfg.batch_size)
            .await?;

        debug!(count = candidates.len(), "Reconciliation candidates loaded");

        let mut summary = ReconciliationSummary::default();

        for (index, tx) in candidates.iter().enumerate() {
            // keeps a long pass from going stale under another instance
            if index > 0 && !Self::renew(state, holder).await {
                warn!(
                    job = RECONCILIATION_JOB,
                    holder = %holder,
                    remaining = candidates.len() - index,
                    "Lost the reconciliation lock, stopping pass"
                );
                break;
            }

            summary.processed += 1;

            match Self::reconcile_one(state, tx, &policy).await {
                CandidateOutcome::Completed => summary.completed += 1,
                CandidateOutcome::Failed => summary.failed += 1,
                CandidateOutcome::StillPending => summary.still_pending += 1,
                CandidateOutcome::Errored => summary.errored += 1,
                CandidateOutcome::AlreadySettled => {}
            }
        }

        Ok(summary)
    }

    async fn renew(state: &AppState, holder: &str) -> bool {
        match state
            .ledger
            .renew_lock(RECONCILIATION_JOB, holder, Utc::now())
            .await
        {
            Ok(held) => held,
            Err(e) => {
                error!(job = RECONCILIATION_JOB, error = %e, "Failed to renew lock");
                false
            }
        }
    }

    async fn reconcile_one(
        state: &AppState,
        tx: &Transaction,
        policy: &RetryPolicy,
    ) -> CandidateOutcome {
        let gateway = match state.gateways.for_rail(tx.rail) {
            Ok(gateway) => gateway,
            Err(e) => {
                warn!(transaction_id = %tx.transaction_id, error = %e, "No gateway for candidate");
                return CandidateOutcome::Errored;
            }
        };

        let settlement = match Self::check_with_retry(gateway.as_ref(), tx, policy).await {
            GatewayResult::Success { gateway_txn_ref } => Settlement::Completed {
                reference_no: gateway_txn_ref,
            },
            GatewayResult::Failed {
                reason_code,
                message,
            } => Settlement::Failed {
                code: reason_code,
                message,
            },
            GatewayResult::Pending { .. } => return CandidateOutcome::StillPending,
            GatewayResult::TransportError { cause } => {
                warn!(
                    transaction_id = %tx.transaction_id,
                    cause = %cause,
                    "Gateway unreachable after retries, leaving PENDING"
                );
                return CandidateOutcome::StillPending;
            }
        };

        match state.ledger.settle_transaction(tx.id, settlement).await {
            Ok(Some(settled)) => {
                info!(
                    transaction_id = %settled.transaction_id,
                    status = %settled.status,
                    "Transaction reconciled"
                );
                match settled.status {
                    TransactionStatus::Completed => CandidateOutcome::Completed,
                    _ => CandidateOutcome::Failed,
                }
            }
            Ok(None) => {
                debug!(transaction_id = %tx.transaction_id, "Already settled by another actor");
                CandidateOutcome::AlreadySettled
            }
            Err(ApiError::InsufficientBalance {
                required,
                available,
            }) => {
                error!(
                    alert = "manual_reconciliation",
                    transaction_id = %tx.transaction_id,
                    user_id = %tx.user_id,
                    required,
                    available,
                    "Gateway completed payout but the balance no longer covers it"
                );

                AuditService::log_event(
                    state,
                    None,
                    "reconciliation.internal_inconsistency",
                    Some("transaction"),
                    Some(&tx.transaction_id),
                    json!({
                        "user_id": tx.user_id,
                        "required": required,
                        "available": available,
                    }),
                )
                .await;

                CandidateOutcome::Errored
            }
            Err(e) => {
                error!(transaction_id = %tx.transaction_id, error = %e, "Failed to settle transaction");
                CandidateOutcome::Errored
            }
        }
    }

    async fn check_with_retry(
        gateway: &dyn GatewayClient,
        tx: &Transaction,
        policy: &RetryPolicy,
    ) -> GatewayResult {
        let lookup = StatusLookup {
            idempotency_key: &tx.transaction_id,
            gateway_txn_ref: tx.reference_no.as_deref(),
        };

        let mut attempt = 1;
        loop {
            let result = gateway.check_status(&lookup).await;

            match result {
                GatewayResult::TransportError { ref cause } if attempt < policy.max_attempts => {
                    let delay = policy.delay_for_attempt(attempt);
                    debug!(
                        transaction_id = %tx.transaction_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        cause = %cause,
                        "Status check failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
