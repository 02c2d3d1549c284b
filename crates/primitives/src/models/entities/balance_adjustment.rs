use crate::models::entities::enum_types::AdjustmentKind;
use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::balance_adjustments)]
#[diesel(belongs_to(crate::models::entities::user::User))]
pub struct BalanceAdjustment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admin_id: Uuid,
    pub kind: AdjustmentKind,
    pub amount: i64,
    pub reason: String,
    pub balance_before: i64,
    pub balance_after: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::balance_adjustments)]
pub struct NewBalanceAdjustment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admin_id: Uuid,
    pub kind: AdjustmentKind,
    pub amount: i64,
    pub reason: String,
    pub balance_before: i64,
    pub balance_after: i64,
}
