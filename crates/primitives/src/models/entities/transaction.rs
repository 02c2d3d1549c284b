use crate::models::entities::enum_types::{FailureKind, PayoutRail, TransactionStatus};
use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

/// One payout attempt. `transaction_id` is the caller's idempotency key and
/// is unique across the table.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(belongs_to(crate::models::entities::user::User))]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub beneficiary_id: Uuid,
    pub rail: PayoutRail,

    pub amount: i64,
    pub charge_amount: i64,

    pub transaction_id: String,
    pub reference_no: Option<String>,

    pub status: TransactionStatus,
    pub failure_kind: Option<FailureKind>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,

    /// Set once `amount + charge_amount` has left the sender's balance.
    pub balance_applied: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn total_debit(&self) -> i64 {
        self.amount + self.charge_amount
    }

    /// True when the gateway never gave a definitive answer for this attempt.
    pub fn outcome_unknown(&self) -> bool {
        self.failure_kind == Some(FailureKind::Transport)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::transactions)]
pub struct NewTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub beneficiary_id: Uuid,
    pub rail: PayoutRail,
    pub amount: i64,
    pub charge_amount: i64,
    pub transaction_id: String,
    pub reference_no: Option<String>,
    pub status: TransactionStatus,
    pub failure_kind: Option<FailureKind>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub balance_applied: bool,
    pub settled_at: Option<DateTime<Utc>>,
}

impl NewTransaction {
    pub fn total_debit(&self) -> i64 {
        self.amount + self.charge_amount
    }

    pub fn into_transaction(self, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: self.id,
            user_id: self.user_id,
            beneficiary_id: self.beneficiary_id,
            rail: self.rail,
            amount: self.amount,
            charge_amount: self.charge_amount,
            transaction_id: self.transaction_id,
            reference_no: self.reference_no,
            settled_at: self.settled_at,
            status: self.status,
            failure_kind: self.failure_kind,
            failure_code: self.failure_code,
            failure_message: self.failure_message,
            balance_applied: self.balance_applied,
            created_at: now,
            updated_at: now,
        }
    }
}
