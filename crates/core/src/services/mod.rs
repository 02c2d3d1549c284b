pub mod audit_service;
pub mod balance_adjustment_service;
pub mod beneficiary_service;
pub mod charge_service;
pub mod payout_service;
pub mod reconciliation_service;
pub mod transaction_service;
