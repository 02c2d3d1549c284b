use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Flat fee for payouts whose amount falls in `[min_amount, max_amount]`,
/// both ends inclusive. All values are paise.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::charge_rules)]
pub struct ChargeRule {
    pub id: Uuid,
    pub min_amount: i64,
    pub max_amount: i64,
    pub charge: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ChargeRule {
    pub fn contains(&self, amount: i64) -> bool {
        self.min_amount <= amount && amount <= self.max_amount
    }
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = crate::schema::charge_rules)]
pub struct NewChargeRule {
    pub min_amount: i64,
    pub max_amount: i64,
    pub charge: i64,
}
