pub mod audit_log;
pub mod balance_adjustment;
pub mod balance_request;
pub mod beneficiary;
pub mod charge_rule;
pub mod cron_lock;
pub mod enum_types;
pub mod transaction;
pub mod user;

pub use audit_log::*;
pub use balance_adjustment::*;
pub use balance_request::*;
pub use beneficiary::*;
pub use charge_rule::*;
pub use cron_lock::*;
pub use enum_types::*;
pub use transaction::*;
pub use user::*;
