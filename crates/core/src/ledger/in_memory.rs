use super::{AdjustmentInstruction, LedgerStore, PayoutRecord, Settlement};
use crate::repositories::transaction_repository::{UNSETTLED_DEBIT_CODE, UNSETTLED_DEBIT_MESSAGE};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::{
    AdjustmentKind, AuditLog, BalanceAdjustment, BalanceRequest, BalanceRequestDecision,
    BalanceRequestStatus, Beneficiary, ChargeRule, CronLock, FailureKind, NewAuditLog,
    NewBalanceRequest, NewTransaction, Transaction, TransactionStatus, User,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    beneficiaries: HashMap<Uuid, Beneficiary>,
    charge_rules: Vec<ChargeRule>,
    transactions: Vec<Transaction>,
    balance_requests: HashMap<Uuid, BalanceRequest>,
    adjustments: Vec<BalanceAdjustment>,
    locks: HashMap<String, CronLock>,
    audit: Vec<AuditLog>,
}

impl State {
    fn user_mut(&mut self, user_id: Uuid) -> Result<&mut User, ApiError> {
        self.users
            .get_mut(&user_id)
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    }

    /// Debits the unheld part of the balance.
    fn debit(&mut self, user_id: Uuid, amount: i64) -> Result<i64, ApiError> {
        let user = self.user_mut(user_id)?;

        if user.available() < amount {
            return Err(ApiError::InsufficientBalance {
                required: amount,
                available: user.available(),
            });
        }

        user.balance -= amount;
        user.updated_at = Utc::now();
        Ok(user.balance)
    }

    fn credit(&mut self, user_id: Uuid, amount: i64) -> Result<i64, ApiError> {
        let user = self.user_mut(user_id)?;

        user.balance = user
            .balance
            .checked_add(amount)
            .ok_or_else(|| ApiError::InvalidRequest("Balance would overflow".into()))?;
        user.updated_at = Utc::now();
        Ok(user.balance)
    }

    fn reserve(&mut self, user_id: Uuid, amount: i64) -> Result<User, ApiError> {
        let user = self.user_mut(user_id)?;

        if user.available() < amount {
            return Err(ApiError::InsufficientBalance {
                required: amount,
                available: user.available(),
            });
        }

        user.reserved += amount;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    fn release_hold(&mut self, user_id: Uuid, amount: i64) -> bool {
        match self.users.get_mut(&user_id) {
            Some(user) if user.reserved >= amount => {
                user.reserved -= amount;
                user.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    fn settle_hold(&mut self, user_id: Uuid, amount: i64) -> bool {
        match self.users.get_mut(&user_id) {
            Some(user) if user.reserved >= amount && user.balance >= amount => {
                user.reserved -= amount;
                user.balance -= amount;
                user.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }
}

/// Ledger held in process memory. Every operation runs under one mutex, which
/// gives it the same serialisation a row lock gives the Postgres store.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    pub async fn insert_beneficiary(&self, beneficiary: Beneficiary) {
        self.state
            .lock()
            .await
            .beneficiaries
            .insert(beneficiary.id, beneficiary);
    }

    pub async fn set_charge_rules(&self, mut rules: Vec<ChargeRule>) {
        rules.sort_by_key(|r| r.min_amount);
        self.state.lock().await.charge_rules = rules;
    }

    /// Seeds a transaction as-is, including a backdated `created_at`.
    pub async fn insert_transaction(&self, tx: Transaction) {
        self.state.lock().await.transactions.push(tx);
    }

    pub async fn insert_lock(&self, lock: CronLock) {
        self.state
            .lock()
            .await
            .locks
            .insert(lock.job_name.clone(), lock);
    }

    pub async fn user(&self, user_id: Uuid) -> Option<User> {
        self.state.lock().await.users.get(&user_id).cloned()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    pub async fn adjustments(&self) -> Vec<BalanceAdjustment> {
        self.state.lock().await.adjustments.clone()
    }

    pub async fn audit_events(&self) -> Vec<AuditLog> {
        self.state.lock().await.audit.clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_beneficiary(
        &self,
        beneficiary_id: Uuid,
    ) -> Result<Option<Beneficiary>, ApiError> {
        Ok(self
            .state
            .lock()
            .await
            .beneficiaries
            .get(&beneficiary_id)
            .cloned())
    }

    async fn set_beneficiary_verification(
        &self,
        beneficiary_id: Uuid,
        verified: bool,
        verified_name: Option<String>,
    ) -> Result<Beneficiary, ApiError> {
        let mut state = self.state.lock().await;
        let beneficiary = state
            .beneficiaries
            .get_mut(&beneficiary_id)
            .ok_or_else(|| ApiError::NotFound("Beneficiary not found".into()))?;

        beneficiary.is_verified = verified;
        beneficiary.verified_name = verified_name;
        beneficiary.updated_at = Utc::now();
        Ok(beneficiary.clone())
    }

    async fn active_charge_rules(&self) -> Result<Vec<ChargeRule>, ApiError> {
        Ok(self
            .state
            .lock()
            .await
            .charge_rules
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn reserve_funds(&self, user_id: Uuid, amount: i64) -> Result<User, ApiError> {
        self.state.lock().await.reserve(user_id, amount)
    }

    async fn release_funds(&self, user_id: Uuid, amount: i64) -> Result<(), ApiError> {
        if !self.state.lock().await.release_hold(user_id, amount) {
            warn!(user_id = %user_id, amount, "No hold left to release");
        }
        Ok(())
    }

    async fn record_payout(&self, new_tx: NewTransaction) -> Result<PayoutRecord, ApiError> {
        let mut state = self.state.lock().await;
        let total = new_tx.total_debit();

        if let Some(existing) = state
            .transactions
            .iter()
            .find(|t| t.transaction_id == new_tx.transaction_id)
            .cloned()
        {
            state.release_hold(new_tx.user_id, total);
            return Ok(PayoutRecord::Existing(existing));
        }

        let mut tx = new_tx.into_transaction(Utc::now());

        let record = if !tx.balance_applied {
            state.release_hold(tx.user_id, total);
            PayoutRecord::Created(tx.clone())
        } else if state.settle_hold(tx.user_id, total) {
            PayoutRecord::Created(tx.clone())
        } else {
            state.release_hold(tx.user_id, total);
            tx.status = TransactionStatus::Pending;
            tx.balance_applied = false;
            tx.settled_at = None;
            tx.failure_code = Some(UNSETTLED_DEBIT_CODE.to_string());
            tx.failure_message = Some(UNSETTLED_DEBIT_MESSAGE.to_string());
            PayoutRecord::Unsettled(tx.clone())
        };

        state.transactions.push(tx);
        Ok(record)
    }

    async fn find_transaction_by_key(&self, key: &str) -> Result<Option<Transaction>, ApiError> {
        Ok(self
            .state
            .lock()
            .await
            .transactions
            .iter()
            .find(|t| t.transaction_id == key)
            .cloned())
    }

    async fn recent_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        let state = self.state.lock().await;
        let mut rows: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn pending_transactions(
        &self,
        created_after: DateTime<Utc>,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        let state = self.state.lock().await;
        let mut rows: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Pending)
            .filter(|t| t.created_at > created_after && t.created_at < created_before)
            .cloned()
            .collect();

        rows.sort_by_key(|t| t.created_at);
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn settle_transaction(
        &self,
        id: Uuid,
        settlement: Settlement,
    ) -> Result<Option<Transaction>, ApiError> {
        let mut state = self.state.lock().await;

        let idx = state
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ApiError::NotFound("Transaction not found".into()))?;

        let current = state.transactions[idx].clone();
        if current.status != TransactionStatus::Pending {
            return Ok(None);
        }

        let now = Utc::now();

        match settlement {
            Settlement::Completed { reference_no } => {
                if !current.balance_applied {
                    state.debit(current.user_id, current.total_debit())?;
                }

                let tx = &mut state.transactions[idx];
                tx.status = TransactionStatus::Completed;
                tx.reference_no = reference_no.or(current.reference_no);
                tx.balance_applied = true;
                tx.failure_code = None;
                tx.failure_message = None;
                tx.settled_at = Some(now);
                tx.updated_at = now;
            }
            Settlement::Failed { code, message } => {
                let tx = &mut state.transactions[idx];
                tx.status = TransactionStatus::Failed;
                tx.failure_kind = Some(FailureKind::GatewayRejected);
                tx.failure_code = Some(code);
                tx.failure_message = Some(message);
                tx.settled_at = Some(now);
                tx.updated_at = now;
            }
        }

        Ok(Some(state.transactions[idx].clone()))
    }

    async fn try_acquire_lock(
        &self,
        job: &str,
        holder: &str,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<bool, ApiError> {
        let mut state = self.state.lock().await;

        if let Some(lock) = state.locks.get(job) {
            if lock.blocks(now, timeout) {
                return Ok(false);
            }
        }

        state.locks.insert(
            job.to_string(),
            CronLock {
                job_name: job.to_string(),
                is_locked: true,
                locked_at: Some(now),
                locked_by: Some(holder.to_string()),
            },
        );
        Ok(true)
    }

    async fn renew_lock(
        &self,
        job: &str,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let mut state = self.state.lock().await;

        match state.locks.get_mut(job) {
            Some(lock) if lock.is_locked && lock.locked_by.as_deref() == Some(holder) => {
                lock.locked_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_lock(&self, job: &str, holder: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;

        if let Some(lock) = state.locks.get_mut(job) {
            if lock.locked_by.as_deref() == Some(holder) {
                lock.is_locked = false;
            }
        }
        Ok(())
    }

    async fn find_lock(&self, job: &str) -> Result<Option<CronLock>, ApiError> {
        Ok(self.state.lock().await.locks.get(job).cloned())
    }

    async fn create_balance_request(
        &self,
        request: NewBalanceRequest,
    ) -> Result<BalanceRequest, ApiError> {
        let mut state = self.state.lock().await;

        if state.balance_requests.values().any(|r| r.utr == request.utr) {
            return Err(ApiError::InvalidRequest(format!(
                "UTR {} has already been submitted",
                request.utr
            )));
        }

        let created = BalanceRequest {
            id: request.id,
            user_id: request.user_id,
            amount: request.amount,
            utr: request.utr,
            status: BalanceRequestStatus::New,
            balance_before: None,
            balance_after: None,
            remarks: None,
            resolved_by: None,
            created_at: Utc::now(),
            resolved_at: None,
        };

        state.balance_requests.insert(created.id, created.clone());
        Ok(created)
    }

    async fn resolve_balance_request(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        decision: BalanceRequestDecision,
        remarks: Option<String>,
    ) -> Result<BalanceRequest, ApiError> {
        let mut state = self.state.lock().await;

        let request = state
            .balance_requests
            .get(&request_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Balance request not found".into()))?;

        if request.status.is_resolved() {
            return Err(ApiError::InvalidRequest(format!(
                "Balance request is already {}",
                request.status
            )));
        }

        let snapshot = match decision {
            BalanceRequestDecision::Confirm => {
                let after = state.credit(request.user_id, request.amount)?;
                Some((after - request.amount, after))
            }
            BalanceRequestDecision::Reject => None,
        };

        let resolved = BalanceRequest {
            status: decision.target_status(),
            balance_before: snapshot.map(|(before, _)| before),
            balance_after: snapshot.map(|(_, after)| after),
            remarks,
            resolved_by: Some(admin_id),
            resolved_at: Some(Utc::now()),
            ..request
        };

        state.balance_requests.insert(request_id, resolved.clone());
        Ok(resolved)
    }

    async fn apply_adjustment(
        &self,
        instruction: AdjustmentInstruction,
    ) -> Result<BalanceAdjustment, ApiError> {
        let mut state = self.state.lock().await;

        let (before, after) = match instruction.kind {
            AdjustmentKind::Addition => {
                let after = state.credit(instruction.user_id, instruction.amount)?;
                (after - instruction.amount, after)
            }
            AdjustmentKind::Deduction => {
                let after = state.debit(instruction.user_id, instruction.amount)?;
                (after + instruction.amount, after)
            }
        };

        let adjustment = BalanceAdjustment {
            id: Uuid::new_v4(),
            user_id: instruction.user_id,
            admin_id: instruction.admin_id,
            kind: instruction.kind,
            amount: instruction.amount,
            reason: instruction.reason,
            balance_before: before,
            balance_after: after,
            created_at: Utc::now(),
        };

        state.adjustments.push(adjustment.clone());
        Ok(adjustment)
    }

    async fn append_audit(&self, entry: NewAuditLog) -> Result<(), ApiError> {
        self.state.lock().await.audit.push(AuditLog {
            id: entry.id,
            actor_id: entry.actor_id,
            event_type: entry.event_type,
            target_type: entry.target_type,
            target_id: entry.target_id,
            metadata: entry.metadata,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payout_primitives::models::entities::{PayoutRail, VerificationStatus};

    fn user(balance: i64) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@example.com".into(),
            balance,
            reserved: 0,
            verification_status: VerificationStatus::Verified,
            imps_enabled: true,
            upi_enabled: true,
            is_disabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn user_with(id: Uuid, balance: i64) -> User {
        User { id, ..user(balance) }
    }

    fn pending(user_id: Uuid, key: &str) -> NewTransaction {
        NewTransaction {
            id: Uuid::new_v4(),
            user_id,
            beneficiary_id: Uuid::new_v4(),
            rail: PayoutRail::Imps,
            amount: 1_000,
            charge_amount: 50,
            transaction_id: key.into(),
            reference_no: None,
            status: TransactionStatus::Pending,
            failure_kind: None,
            failure_code: None,
            failure_message: None,
            balance_applied: false,
            settled_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_key_returns_existing_row() {
        let store = InMemoryLedgerStore::new();
        let u = user(10_000);
        store.insert_user(u.clone()).await;

        let first = store.record_payout(pending(u.id, "key-0001")).await.unwrap();
        let second = store.record_payout(pending(u.id, "key-0001")).await.unwrap();

        assert!(!first.is_existing());
        assert!(second.is_existing());
        assert_eq!(first.transaction(), second.transaction());
        assert_eq!(store.transactions().await.len(), 1);
    }

    fn completed(user_id: Uuid, key: &str) -> NewTransaction {
        NewTransaction {
            status: TransactionStatus::Completed,
            reference_no: Some("GW1".into()),
            balance_applied: true,
            settled_at: Some(Utc::now()),
            ..pending(user_id, key)
        }
    }

    #[tokio::test]
    async fn a_hold_cannot_fund_two_payouts() {
        let store = InMemoryLedgerStore::new();
        let u = user(1_500);
        store.insert_user(u.clone()).await;

        let held = store.reserve_funds(u.id, 1_050).await.unwrap();
        assert_eq!(held.reserved, 1_050);
        assert_eq!(held.available(), 450);

        let err = store.reserve_funds(u.id, 1_050).await.unwrap_err();
        assert!(matches!(err, ApiError::InsufficientBalance { required: 1_050, available: 450 }));

        // admin deductions cannot eat into held funds either
        let err = store
            .apply_adjustment(AdjustmentInstruction {
                admin_id: Uuid::new_v4(),
                user_id: u.id,
                kind: AdjustmentKind::Deduction,
                amount: 500,
                reason: "chargeback".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InsufficientBalance { available: 450, .. }));

        store.release_funds(u.id, 1_050).await.unwrap();
        let after = store.user(u.id).await.unwrap();
        assert_eq!((after.balance, after.reserved), (1_500, 0));
    }

    #[tokio::test]
    async fn completed_row_turns_the_hold_into_a_debit() {
        let store = InMemoryLedgerStore::new();
        let u = user(5_000);
        store.insert_user(u.clone()).await;

        store.reserve_funds(u.id, 1_050).await.unwrap();
        let record = store.record_payout(completed(u.id, "key-0002")).await.unwrap();
        assert!(matches!(record, PayoutRecord::Created(_)));

        let after = store.user(u.id).await.unwrap();
        assert_eq!((after.balance, after.reserved), (3_950, 0));

        // a replayed key only gives back its own hold
        store.reserve_funds(u.id, 1_050).await.unwrap();
        let replay = store.record_payout(completed(u.id, "key-0002")).await.unwrap();
        assert!(replay.is_existing());

        let after = store.user(u.id).await.unwrap();
        assert_eq!((after.balance, after.reserved), (3_950, 0));
    }

    #[tokio::test]
    async fn lost_hold_leaves_an_unsettled_pending_row() {
        let store = InMemoryLedgerStore::new();
        let u = user(5_000);
        store.insert_user(u.clone()).await;

        store.reserve_funds(u.id, 1_050).await.unwrap();
        // balance wiped while the gateway call was in flight
        store.insert_user(user_with(u.id, 0)).await;

        let record = store.record_payout(completed(u.id, "key-0004")).await.unwrap();
        let PayoutRecord::Unsettled(tx) = record else {
            panic!("expected an unsettled record, got {record:?}");
        };
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(!tx.balance_applied);
        assert!(tx.settled_at.is_none());
        assert_eq!(tx.failure_code.as_deref(), Some(UNSETTLED_DEBIT_CODE));

        // the key is taken, so a retry replays
        let replay = store.record_payout(completed(u.id, "key-0004")).await.unwrap();
        assert!(replay.is_existing());
        assert_eq!(store.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn credit_refuses_to_overflow() {
        let store = InMemoryLedgerStore::new();
        let u = user(10);
        store.insert_user(u.clone()).await;

        let err = store
            .apply_adjustment(AdjustmentInstruction {
                admin_id: Uuid::new_v4(),
                user_id: u.id,
                kind: AdjustmentKind::Addition,
                amount: i64::MAX,
                reason: "fat finger".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(store.user(u.id).await.unwrap().balance, 10);
        assert!(store.adjustments().await.is_empty());
    }

    #[tokio::test]
    async fn settle_applies_debit_once() {
        let store = InMemoryLedgerStore::new();
        let u = user(5_000);
        store.insert_user(u.clone()).await;

        let created = store.record_payout(pending(u.id, "key-0003")).await.unwrap();
        let id = created.transaction().id;

        let settled = store
            .settle_transaction(id, Settlement::Completed { reference_no: Some("R1".into()) })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.status, TransactionStatus::Completed);
        assert!(settled.balance_applied);

        let again = store
            .settle_transaction(id, Settlement::Completed { reference_no: None })
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(store.user(u.id).await.unwrap().balance, 3_950);
    }

    #[tokio::test]
    async fn lock_is_exclusive_until_released_or_stale() {
        let store = InMemoryLedgerStore::new();
        let now = Utc::now();
        let timeout = Duration::minutes(10);

        assert!(store.try_acquire_lock("job", "a", now, timeout).await.unwrap());
        assert!(!store.try_acquire_lock("job", "b", now, timeout).await.unwrap());

        let later = now + Duration::minutes(11);
        assert!(store.try_acquire_lock("job", "b", later, timeout).await.unwrap());

        // Stale holder must not free the lock it lost.
        store.release_lock("job", "a").await.unwrap();
        assert!(store.find_lock("job").await.unwrap().unwrap().is_locked);

        store.release_lock("job", "b").await.unwrap();
        assert!(!store.find_lock("job").await.unwrap().unwrap().is_locked);
    }

    #[tokio::test]
    async fn renew_only_extends_the_current_holder() {
        let store = InMemoryLedgerStore::new();
        let now = Utc::now();
        let timeout = Duration::minutes(10);

        assert!(store.try_acquire_lock("job", "a", now, timeout).await.unwrap());

        let later = now + Duration::minutes(8);
        assert!(store.renew_lock("job", "a", later).await.unwrap());
        assert!(!store.renew_lock("job", "b", later).await.unwrap());

        // renewed at +8, so still held at +15
        let check = now + Duration::minutes(15);
        assert!(!store.try_acquire_lock("job", "b", check, timeout).await.unwrap());

        store.release_lock("job", "a").await.unwrap();
        assert!(!store.renew_lock("job", "a", check).await.unwrap());
    }
}
