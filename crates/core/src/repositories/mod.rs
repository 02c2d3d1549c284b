pub mod audit_repository;
pub mod balance_adjustment_repository;
pub mod balance_request_repository;
pub mod beneficiary_repository;
pub mod charge_rule_repository;
pub mod cron_lock_repository;
pub mod transaction_repository;
pub mod user_repository;
