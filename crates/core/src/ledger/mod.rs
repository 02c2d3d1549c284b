//! Durable record of balances and every balance-affecting event.
//!
//! [`LedgerStore`] owns the atomicity of balance mutation: callers never read a
//! balance and write it back themselves. Two adapters ship with the crate, a
//! diesel/Postgres store for production and an in-memory store with the same
//! observable contract for tests and local runs.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PgLedgerStore;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::{
    AdjustmentKind, BalanceAdjustment, BalanceRequest, BalanceRequestDecision, Beneficiary,
    ChargeRule, CronLock, NewAuditLog, NewBalanceRequest, NewTransaction, Transaction, User,
};
use uuid::Uuid;

/// Outcome of persisting a payout under its idempotency key.
#[derive(Debug, Clone, PartialEq)]
pub enum PayoutRecord {
    /// This call inserted the row and resolved its hold.
    Created(Transaction),
    /// The key was already taken; the stored row is returned untouched.
    Existing(Transaction),
    /// The gateway accepted the payout but the debit could not be applied.
    /// The row stays PENDING under its key so reconciliation can settle it.
    Unsettled(Transaction),
}

impl PayoutRecord {
    pub fn transaction(&self) -> &Transaction {
        match self {
            PayoutRecord::Created(tx)
            | PayoutRecord::Existing(tx)
            | PayoutRecord::Unsettled(tx) => tx,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, PayoutRecord::Existing(_))
    }
}

/// Definitive answer used to move a PENDING transaction to a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Completed { reference_no: Option<String> },
    Failed { code: String, message: String },
}

#[derive(Debug, Clone)]
pub struct AdjustmentInstruction {
    pub admin_id: Uuid,
    pub user_id: Uuid,
    pub kind: AdjustmentKind,
    pub amount: i64,
    pub reason: String,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn ping(&self) -> Result<(), ApiError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ApiError>;

    async fn find_beneficiary(&self, beneficiary_id: Uuid)
        -> Result<Option<Beneficiary>, ApiError>;

    async fn set_beneficiary_verification(
        &self,
        beneficiary_id: Uuid,
        verified: bool,
        verified_name: Option<String>,
    ) -> Result<Beneficiary, ApiError>;

    /// Active charge rules ordered by `min_amount`.
    async fn active_charge_rules(&self) -> Result<Vec<ChargeRule>, ApiError>;

    /// Holds `amount` against the user's balance. Fails with
    /// `InsufficientBalance` when the unheld balance is short, so two payouts
    /// can never both be funded by the same paise.
    async fn reserve_funds(&self, user_id: Uuid, amount: i64) -> Result<User, ApiError>;

    /// Drops a hold placed by [`LedgerStore::reserve_funds`].
    async fn release_funds(&self, user_id: Uuid, amount: i64) -> Result<(), ApiError>;

    /// Inserts the transaction unless its idempotency key exists, and resolves
    /// the hold of `new_tx.total_debit()` in the same unit of work: a
    /// `balance_applied` row turns it into a debit, any other outcome
    /// releases it.
    async fn record_payout(&self, new_tx: NewTransaction) -> Result<PayoutRecord, ApiError>;

    async fn find_transaction_by_key(&self, key: &str) -> Result<Option<Transaction>, ApiError>;

    async fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError>;

    /// PENDING transactions created inside `(created_after, created_before)`, oldest first.
    async fn pending_transactions(
        &self,
        created_after: DateTime<Utc>,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError>;

    /// Moves a PENDING transaction to a terminal status exactly once. Returns
    /// `None` when the row was no longer PENDING.
    async fn settle_transaction(
        &self,
        id: Uuid,
        settlement: Settlement,
    ) -> Result<Option<Transaction>, ApiError>;

    /// Takes `job` for `holder` unless a holder younger than `timeout` owns it.
    async fn try_acquire_lock(
        &self,
        job: &str,
        holder: &str,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<bool, ApiError>;

    /// Refreshes the lock timestamp. `false` once `holder` no longer owns `job`.
    async fn renew_lock(&self, job: &str, holder: &str, now: DateTime<Utc>)
        -> Result<bool, ApiError>;

    async fn release_lock(&self, job: &str, holder: &str) -> Result<(), ApiError>;

    async fn find_lock(&self, job: &str) -> Result<Option<CronLock>, ApiError>;

    async fn create_balance_request(
        &self,
        request: NewBalanceRequest,
    ) -> Result<BalanceRequest, ApiError>;

    async fn resolve_balance_request(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        decision: BalanceRequestDecision,
        remarks: Option<String>,
    ) -> Result<BalanceRequest, ApiError>;

    async fn apply_adjustment(
        &self,
        instruction: AdjustmentInstruction,
    ) -> Result<BalanceAdjustment, ApiError>;

    async fn append_audit(&self, entry: NewAuditLog) -> Result<(), ApiError>;
}
