pub mod adjust_balance;
pub mod balance_request;
pub mod health;
pub mod invalidate_beneficiary;
pub mod payout;
pub mod payout_status;
pub mod resolve_balance_request;
pub mod run_reconciliation;
pub mod transactions;
pub mod verify_beneficiary;
