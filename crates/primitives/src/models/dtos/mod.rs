pub mod balance_dto;
pub mod beneficiary_dto;
pub mod gateway_dto;
pub mod health_dto;
pub mod payout_dto;
pub mod reconciliation_dto;
pub mod transaction_dto;

pub use balance_dto::*;
pub use beneficiary_dto::*;
pub use gateway_dto::*;
pub use health_dto::*;
pub use payout_dto::*;
pub use reconciliation_dto::*;
pub use transaction_dto::*;
