//! Wire shapes exchanged with the payout gateways.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ImpsPayoutRequest<'a> {
    pub client_reference: &'a str,
    /// Rupees with two decimals, e.g. "5000.00".
    pub amount: String,
    pub beneficiary_name: &'a str,
    pub account_number: &'a str,
    pub ifsc: &'a str,
    pub mode: &'static str,
}

/// Reply to both payout submission and status lookup.
#[derive(Debug, Deserialize)]
pub struct ImpsPayoutReply {
    pub status: Option<String>,
    pub transaction_no: Option<String>,
    pub error_code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImpsAccountResolveRequest<'a> {
    pub account_number: &'a str,
    pub ifsc: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ImpsAccountResolveReply {
    pub status: Option<String>,
    pub account_holder_name: Option<String>,
    pub error_code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpiPayoutRequest<'a> {
    pub client_txn_id: &'a str,
    pub payee_vpa: &'a str,
    pub payee_name: &'a str,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct UpiPayoutReply {
    pub txn_status: Option<String>,
    pub rrn: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpiVpaValidateRequest<'a> {
    pub vpa: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct UpiVpaValidateReply {
    pub valid: bool,
    pub payee_name: Option<String>,
    pub error_description: Option<String>,
}
