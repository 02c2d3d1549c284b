use super::{AdjustmentInstruction, LedgerStore, PayoutRecord, Settlement};
use crate::repositories::audit_repository::AuditLogRepository;
use crate::repositories::balance_adjustment_repository::BalanceAdjustmentRepository;
use crate::repositories::balance_request_repository::BalanceRequestRepository;
use crate::repositories::beneficiary_repository::BeneficiaryRepository;
use crate::repositories::charge_rule_repository::ChargeRuleRepository;
use crate::repositories::cron_lock_repository::CronLockRepository;
use crate::repositories::transaction_repository::TransactionRepository;
use crate::repositories::user_repository::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::{
    AdjustmentKind, BalanceAdjustment, BalanceRequest, BalanceRequestDecision, Beneficiary,
    ChargeRule, CronLock, NewAuditLog, NewBalanceAdjustment, NewBalanceRequest, NewTransaction,
    Transaction, TransactionStatus, User,
};
use tracing::{error, warn};
use uuid::Uuid;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Ledger backed by PostgreSQL. Diesel is synchronous, so every operation runs
/// on the blocking pool with its own pooled connection.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: DbPool,
}

impl PgLedgerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, ApiError> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| ApiError::DatabaseConnection(e.to_string()))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Ledger task panicked or was cancelled");
            ApiError::Internal("Ledger operation aborted".into())
        })?
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn ping(&self) -> Result<(), ApiError> {
        self.with_conn(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map(|_| ())
                .map_err(ApiError::Database)
        })
        .await
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ApiError> {
        self.with_conn(move |conn| UserRepository::find_by_id(conn, user_id))
            .await
    }

    async fn find_beneficiary(
        &self,
        beneficiary_id: Uuid,
    ) -> Result<Option<Beneficiary>, ApiError> {
        self.with_conn(move |conn| BeneficiaryRepository::find_by_id(conn, beneficiary_id))
            .await
    }

    async fn set_beneficiary_verification(
        &self,
        beneficiary_id: Uuid,
        verified: bool,
        verified_name: Option<String>,
    ) -> Result<Beneficiary, ApiError> {
        self.with_conn(move |conn| {
            BeneficiaryRepository::set_verification(conn, beneficiary_id, verified, verified_name)
        })
        .await
    }

    async fn active_charge_rules(&self) -> Result<Vec<ChargeRule>, ApiError> {
        self.with_conn(ChargeRuleRepository::find_active).await
    }

    async fn reserve_funds(&self, user_id: Uuid, amount: i64) -> Result<User, ApiError> {
        self.with_conn(move |conn| {
            conn.transaction::<_, ApiError, _>(|conn| {
                match UserRepository::reserve(conn, user_id, amount)? {
                    Some(user) => Ok(user),
                    None => Err(UserRepository::shortfall(conn, user_id, amount)),
                }
            })
        })
        .await
    }

    async fn release_funds(&self, user_id: Uuid, amount: i64) -> Result<(), ApiError> {
        self.with_conn(move |conn| {
            if !UserRepository::release_hold(conn, user_id, amount)? {
                warn!(user_id = %user_id, amount, "No hold left to release");
            }
            Ok(())
        })
        .await
    }

    async fn record_payout(&self, new_tx: NewTransaction) -> Result<PayoutRecord, ApiError> {
        self.with_conn(move |conn| {
            conn.transaction::<_, ApiError, _>(|conn| {
                let total = new_tx.total_debit();

                let Some(created) = TransactionRepository::insert_if_absent(conn, &new_tx)? else {
                    let existing = TransactionRepository::find_by_key(conn, &new_tx.transaction_id)?
                        .ok_or_else(|| {
                            ApiError::Internal("Conflicting transaction vanished".into())
                        })?;
                    UserRepository::release_hold(conn, new_tx.user_id, total)?;
                    return Ok(PayoutRecord::Existing(existing));
                };

                if !created.balance_applied {
                    UserRepository::release_hold(conn, new_tx.user_id, total)?;
                    return Ok(PayoutRecord::Created(created));
                }

                if UserRepository::settle_hold(conn, new_tx.user_id, total)?.is_some() {
                    return Ok(PayoutRecord::Created(created));
                }

                UserRepository::release_hold(conn, new_tx.user_id, total)?;
                let unsettled = TransactionRepository::mark_unsettled(conn, created.id)?;
                Ok(PayoutRecord::Unsettled(unsettled))
            })
        })
        .await
    }

    async fn find_transaction_by_key(&self, key: &str) -> Result<Option<Transaction>, ApiError> {
        let key = key.to_string();
        self.with_conn(move |conn| TransactionRepository::find_by_key(conn, &key))
            .await
    }

    async fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        self.with_conn(move |conn| TransactionRepository::recent_for_user(conn, user_id, limit))
            .await
    }

    async fn pending_transactions(
        &self,
        created_after: DateTime<Utc>,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        self.with_conn(move |conn| {
            TransactionRepository::pending_between(conn, created_after, created_before, limit)
        })
        .await
    }

    async fn settle_transaction(
        &self,
        id: Uuid,
        settlement: Settlement,
    ) -> Result<Option<Transaction>, ApiError> {
        self.with_conn(move |conn| {
            conn.transaction::<_, ApiError, _>(|conn| {
                let tx = TransactionRepository::find_by_id_for_update(conn, id)?
                    .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

                if tx.status != TransactionStatus::Pending {
                    return Ok(None);
                }

                match settlement {
                    Settlement::Completed { reference_no } => {
                        if !tx.balance_applied {
                            let total = tx.total_debit();
                            if UserRepository::debit_if_sufficient(conn, tx.user_id, total)?
                                .is_none()
                            {
                                return Err(UserRepository::shortfall(conn, tx.user_id, total));
                            }
                        }

                        TransactionRepository::mark_completed(
                            conn,
                            id,
                            reference_no.or(tx.reference_no),
                        )
                    }
                    Settlement::Failed { code, message } => {
                        TransactionRepository::mark_failed(conn, id, &code, &message)
                    }
                }
            })
        })
        .await
    }

    async fn try_acquire_lock(
        &self,
        job: &str,
        holder: &str,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<bool, ApiError> {
        let (job, holder) = (job.to_string(), holder.to_string());
        self.with_conn(move |conn| {
            CronLockRepository::try_acquire(conn, &job, &holder, now, now - timeout)
        })
        .await
    }

    async fn renew_lock(
        &self,
        job: &str,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let (job, holder) = (job.to_string(), holder.to_string());
        self.with_conn(move |conn| CronLockRepository::renew(conn, &job, &holder, now))
            .await
    }

    async fn release_lock(&self, job: &str, holder: &str) -> Result<(), ApiError> {
        let (job, holder) = (job.to_string(), holder.to_string());
        self.with_conn(move |conn| CronLockRepository::release(conn, &job, &holder).map(|_| ()))
            .await
    }

    async fn find_lock(&self, job: &str) -> Result<Option<CronLock>, ApiError> {
        let job = job.to_string();
        self.with_conn(move |conn| CronLockRepository::find(conn, &job))
            .await
    }

    async fn create_balance_request(
        &self,
        request: NewBalanceRequest,
    ) -> Result<BalanceRequest, ApiError> {
        self.with_conn(move |conn| {
            BalanceRequestRepository::create_if_absent(conn, &request)?.ok_or_else(|| {
                ApiError::InvalidRequest(format!("UTR {} has already been submitted", request.utr))
            })
        })
        .await
    }

    async fn resolve_balance_request(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        decision: BalanceRequestDecision,
        remarks: Option<String>,
    ) -> Result<BalanceRequest, ApiError> {
        self.with_conn(move |conn| {
            conn.transaction::<_, ApiError, _>(|conn| {
                let request = BalanceRequestRepository::find_by_id_for_update(conn, request_id)?
                    .ok_or_else(|| ApiError::NotFound("Balance request not found".into()))?;

                if request.status.is_resolved() {
                    return Err(ApiError::InvalidRequest(format!(
                        "Balance request is already {}",
                        request.status
                    )));
                }

                let snapshot = match decision {
                    BalanceRequestDecision::Confirm => {
                        let after = UserRepository::credit(conn, request.user_id, request.amount)?;
                        Some((after - request.amount, after))
                    }
                    BalanceRequestDecision::Reject => None,
                };

                BalanceRequestRepository::resolve(
                    conn,
                    request_id,
                    decision.target_status(),
                    admin_id,
                    remarks,
                    snapshot,
                )
            })
        })
        .await
    }

    async fn apply_adjustment(
        &self,
        instruction: AdjustmentInstruction,
    ) -> Result<BalanceAdjustment, ApiError> {
        self.with_conn(move |conn| {
            conn.transaction::<_, ApiError, _>(|conn| {
                let AdjustmentInstruction {
                    admin_id,
                    user_id,
                    kind,
                    amount,
                    reason,
                } = instruction;

                let (before, after) = match kind {
                    AdjustmentKind::Addition => {
                        let after = UserRepository::credit(conn, user_id, amount)?;
                        (after - amount, after)
                    }
                    AdjustmentKind::Deduction => {
                        let after = UserRepository::debit_if_sufficient(conn, user_id, amount)?
                            .ok_or_else(|| UserRepository::shortfall(conn, user_id, amount))?;
                        (after + amount, after)
                    }
                };

                BalanceAdjustmentRepository::create(
                    conn,
                    NewBalanceAdjustment {
                        id: Uuid::new_v4(),
                        user_id,
                        admin_id,
                        kind,
                        amount,
                        reason,
                        balance_before: before,
                        balance_after: after,
                    },
                )
            })
        })
        .await
    }

    async fn append_audit(&self, entry: NewAuditLog) -> Result<(), ApiError> {
        self.with_conn(move |conn| AuditLogRepository::create(conn, entry))
            .await
    }
}
