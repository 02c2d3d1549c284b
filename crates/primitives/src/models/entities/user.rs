use crate::models::entities::enum_types::{PayoutRail, VerificationStatus};
use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub balance: i64, // paise
    /// Held by payouts that are still talking to a gateway.
    pub reserved: i64,
    pub verification_status: VerificationStatus,
    pub imps_enabled: bool,
    pub upi_enabled: bool,
    pub is_disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user holds the permission flag for `rail`.
    pub fn can_use(&self, rail: PayoutRail) -> bool {
        match rail {
            PayoutRail::Imps => self.imps_enabled,
            PayoutRail::Upi => self.upi_enabled,
        }
    }

    /// Balance not held by an in-flight payout.
    pub fn available(&self) -> i64 {
        self.balance - self.reserved
    }

    pub fn is_admin(&self) -> bool {
        self.verification_status == VerificationStatus::Admin
    }
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub balance: i64,
    pub verification_status: VerificationStatus,
    pub imps_enabled: bool,
    pub upi_enabled: bool,
}
