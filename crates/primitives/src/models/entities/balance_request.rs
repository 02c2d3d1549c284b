use crate::models::entities::enum_types::BalanceRequestStatus;
use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::balance_requests)]
#[diesel(belongs_to(crate::models::entities::user::User))]
pub struct BalanceRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub utr: String,
    pub status: BalanceRequestStatus,
    pub balance_before: Option<i64>,
    pub balance_after: Option<i64>,
    pub remarks: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::balance_requests)]
pub struct NewBalanceRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub utr: String,
}

/// Admin verdict on a NEW balance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceRequestDecision {
    Confirm,
    Reject,
}

impl BalanceRequestDecision {
    pub fn target_status(&self) -> BalanceRequestStatus {
        match self {
            BalanceRequestDecision::Confirm => BalanceRequestStatus::Confirmed,
            BalanceRequestDecision::Reject => BalanceRequestStatus::Rejected,
        }
    }
}
