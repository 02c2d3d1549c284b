use crate::models::entities::enum_types::PayoutRail;
use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations, Serialize, ToSchema)]
#[diesel(table_name = crate::schema::beneficiaries)]
#[diesel(belongs_to(crate::models::entities::user::User))]
pub struct Beneficiary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub account_number: Option<String>,
    pub ifsc: Option<String>,
    pub vpa: Option<String>,
    pub is_verified: bool,
    pub verified_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a payout lands, shaped by the rail that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Destination {
    BankAccount { account_number: String, ifsc: String },
    Vpa(String),
}

impl Beneficiary {
    /// The destination details `rail` needs, if this beneficiary carries them.
    pub fn destination(&self, rail: PayoutRail) -> Option<Destination> {
        match rail {
            PayoutRail::Imps => match (&self.account_number, &self.ifsc) {
                (Some(account_number), Some(ifsc)) => Some(Destination::BankAccount {
                    account_number: account_number.clone(),
                    ifsc: ifsc.clone(),
                }),
                _ => None,
            },
            PayoutRail::Upi => self.vpa.clone().map(Destination::Vpa),
        }
    }

    /// Rail to use for name-match verification: bank details win over a VPA.
    pub fn primary_rail(&self) -> Option<PayoutRail> {
        if self.destination(PayoutRail::Imps).is_some() {
            Some(PayoutRail::Imps)
        } else if self.vpa.is_some() {
            Some(PayoutRail::Upi)
        } else {
            None
        }
    }
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = crate::schema::beneficiaries)]
pub struct NewBeneficiary<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub account_number: Option<&'a str>,
    pub ifsc: Option<&'a str>,
    pub vpa: Option<&'a str>,
    pub is_verified: bool,
}
