use chrono::{Duration, Utc};
use payout_primitives::models::entities::{
    Beneficiary, ChargeRule, PayoutRail, Transaction, TransactionStatus, User, VerificationStatus,
};
use uuid::Uuid;

/// A single band covering 0.01 to 10,000.00 rupees with a 23.60 fee.
pub fn default_charge_rules() -> Vec<ChargeRule> {
    vec![charge_rule(1, 1_000_000, 2_360)]
}

pub fn charge_rule(min_amount: i64, max_amount: i64, charge: i64) -> ChargeRule {
    ChargeRule {
        id: Uuid::new_v4(),
        min_amount,
        max_amount,
        charge,
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn test_user(balance: i64) -> User {
    let id = Uuid::new_v4();
    User {
        id,
        name: "Asha Rao".to_string(),
        email: format!("user{}@example.com", id.simple()),
        balance,
        reserved: 0,
        verification_status: VerificationStatus::Verified,
        imps_enabled: true,
        upi_enabled: true,
        is_disabled: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn admin_user() -> User {
    User {
        name: "Ops Admin".to_string(),
        verification_status: VerificationStatus::Admin,
        ..test_user(0)
    }
}

pub fn test_beneficiary(user_id: Uuid, verified: bool) -> Beneficiary {
    Beneficiary {
        id: Uuid::new_v4(),
        user_id,
        name: "Ravi Kumar".to_string(),
        account_number: Some("50100012345678".to_string()),
        ifsc: Some("HDFC0001234".to_string()),
        vpa: Some("ravi@okhdfc".to_string()),
        is_verified: verified,
        verified_name: verified.then(|| "Ravi Kumar".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A PENDING payout created `age` ago with no debit applied yet.
pub fn pending_transaction(
    user: &User,
    beneficiary: &Beneficiary,
    key: &str,
    amount: i64,
    charge: i64,
    age: Duration,
) -> Transaction {
    let created_at = Utc::now() - age;
    Transaction {
        id: Uuid::new_v4(),
        user_id: user.id,
        beneficiary_id: beneficiary.id,
        rail: PayoutRail::Imps,
        amount,
        charge_amount: charge,
        transaction_id: key.to_string(),
        reference_no: Some(format!("REF-{}", key)),
        status: TransactionStatus::Pending,
        failure_kind: None,
        failure_code: None,
        failure_message: None,
        balance_applied: false,
        created_at,
        updated_at: created_at,
        settled_at: None,
    }
}
