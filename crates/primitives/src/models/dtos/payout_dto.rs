use crate::models::entities::enum_types::{PayoutRail, TransactionStatus};
use crate::models::entities::transaction::Transaction;
use crate::utility::{from_minor_units, validate_idempotency_key};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct PayoutRequest {
    pub beneficiary_id: Uuid,

    #[schema(value_type = String, example = "5000.00")]
    pub amount: Decimal,

    pub rail: PayoutRail,

    /// Client-generated idempotency key. Resubmitting it returns the original result.
    #[schema(example = "PO-20260105-0001")]
    #[validate(custom(function = "validate_idempotency_key"))]
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayoutResponse {
    pub status: TransactionStatus,
    pub transaction_id: String,
    pub reference_no: Option<String>,

    #[schema(value_type = String, example = "5000.00")]
    pub amount: Decimal,
    #[schema(value_type = String, example = "23.60")]
    pub charge_amount: Decimal,

    pub message: String,

    /// The gateway never answered definitively; query the status instead of resubmitting.
    pub outcome_unknown: bool,

    /// This key was already processed and the stored result is being returned.
    pub duplicate: bool,
}

impl PayoutResponse {
    pub fn from_transaction(tx: &Transaction, duplicate: bool) -> Self {
        let outcome_unknown = tx.outcome_unknown();

        let message = match tx.status {
            TransactionStatus::Completed => "Payout completed".to_string(),
            TransactionStatus::Pending => {
                "Payout accepted by the gateway and awaiting settlement".to_string()
            }
            TransactionStatus::Failed if outcome_unknown => {
                "Gateway outcome unknown. Check the payout status before submitting again"
                    .to_string()
            }
            TransactionStatus::Failed => tx
                .failure_message
                .clone()
                .unwrap_or_else(|| "Payout rejected by the gateway".to_string()),
        };

        Self {
            status: tx.status,
            transaction_id: tx.transaction_id.clone(),
            reference_no: tx.reference_no.clone(),
            amount: from_minor_units(tx.amount),
            charge_amount: from_minor_units(tx.charge_amount),
            message,
            outcome_unknown,
            duplicate,
        }
    }
}
