use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

/// Payout channel. Each rail is served by exactly one gateway client.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    DbEnum,
    Display,
    ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::PayoutRail"]
#[DbValueStyle = "SCREAMING_SNAKE_CASE"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutRail {
    Imps,
    Upi,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::TransactionStatus"]
#[DbValueStyle = "SCREAMING_SNAKE_CASE"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// Why a FAILED transaction failed. `Transport` means the real outcome at the
/// gateway is unknown.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::FailureKind"]
#[DbValueStyle = "SCREAMING_SNAKE_CASE"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    GatewayRejected,
    Transport,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::VerificationStatus"]
#[DbValueStyle = "SCREAMING_SNAKE_CASE"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Unverified,
    Verified,
    CompanyVerified,
    ProprietorVerified,
    Admin,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::BalanceRequestStatus"]
#[DbValueStyle = "SCREAMING_SNAKE_CASE"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceRequestStatus {
    New,
    Confirmed,
    Rejected,
}

impl BalanceRequestStatus {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, BalanceRequestStatus::New)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, ToSchema,
)]
#[ExistingTypePath = "crate::schema::sql_types::AdjustmentKind"]
#[DbValueStyle = "SCREAMING_SNAKE_CASE"]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    Addition,
    Deduction,
}
