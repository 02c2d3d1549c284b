use crate::models::entities::enum_types::{FailureKind, PayoutRail, TransactionStatus};
use crate::models::entities::transaction::Transaction;
use crate::utility::from_minor_units;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub transaction_id: String,
    pub beneficiary_id: Uuid,
    pub rail: PayoutRail,
    #[schema(value_type = String)]
    pub amount: Decimal,
    #[schema(value_type = String)]
    pub charge_amount: Decimal,
    pub reference_no: Option<String>,
    pub status: TransactionStatus,
    pub failure_kind: Option<FailureKind>,
    pub failure_message: Option<String>,
    pub outcome_unknown: bool,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            outcome_unknown: tx.outcome_unknown(),
            id: tx.id,
            transaction_id: tx.transaction_id,
            beneficiary_id: tx.beneficiary_id,
            rail: tx.rail,
            amount: from_minor_units(tx.amount),
            charge_amount: from_minor_units(tx.charge_amount),
            reference_no: tx.reference_no,
            status: tx.status,
            failure_kind: tx.failure_kind,
            failure_message: tx.failure_message,
            created_at: tx.created_at,
            settled_at: tx.settled_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct TransactionsQuery {
    /// Page size, clamped to 1..=50.
    pub limit: Option<i64>,
}
