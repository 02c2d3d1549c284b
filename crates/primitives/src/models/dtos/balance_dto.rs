use crate::models::entities::balance_adjustment::BalanceAdjustment;
use crate::models::entities::balance_request::BalanceRequest;
use crate::models::entities::enum_types::{AdjustmentKind, BalanceRequestStatus};
use crate::utility::from_minor_units;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct BalanceRequestDto {
    #[schema(value_type = String, example = "2500.00")]
    pub amount: Decimal,

    /// Bank UTR of the transfer being claimed.
    #[schema(example = "UTR402612345678")]
    #[validate(length(min = 6, max = 64))]
    pub utr: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct BalanceRequestDecisionDto {
    #[validate(length(max = 255))]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceRequestResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub utr: String,
    pub status: BalanceRequestStatus,
    #[schema(value_type = Option<String>)]
    pub balance_before: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub balance_after: Option<Decimal>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<BalanceRequest> for BalanceRequestResponse {
    fn from(req: BalanceRequest) -> Self {
        Self {
            id: req.id,
            user_id: req.user_id,
            amount: from_minor_units(req.amount),
            utr: req.utr,
            status: req.status,
            balance_before: req.balance_before.map(from_minor_units),
            balance_after: req.balance_after.map(from_minor_units),
            remarks: req.remarks,
            created_at: req.created_at,
            resolved_at: req.resolved_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct AdjustmentRequest {
    pub kind: AdjustmentKind,

    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,

    #[validate(length(min = 3, max = 255))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustmentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: AdjustmentKind,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub reason: String,
    #[schema(value_type = String)]
    pub balance_before: Decimal,
    #[schema(value_type = String)]
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<BalanceAdjustment> for AdjustmentResponse {
    fn from(adj: BalanceAdjustment) -> Self {
        Self {
            id: adj.id,
            user_id: adj.user_id,
            kind: adj.kind,
            amount: from_minor_units(adj.amount),
            reason: adj.reason,
            balance_before: from_minor_units(adj.balance_before),
            balance_after: from_minor_units(adj.balance_after),
            created_at: adj.created_at,
        }
    }
}
