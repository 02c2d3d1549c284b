use crate::models::app_state::imps_details::ImpsInfo;
use crate::models::app_state::jwt_details::JWTInfo;
use crate::models::app_state::reconciliation_details::{parse_or, ReconciliationInfo};
use crate::models::app_state::upi_details::UpiInfo;
use eyre::Report;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_details: JWTInfo,

    pub imps_details: ImpsInfo,

    pub upi_details: UpiInfo,

    pub reconciliation_details: ReconciliationInfo,

    /// Upper bound on every gateway HTTP call.
    pub gateway_timeout_secs: u64,

    pub require_verified_beneficiary: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report> {
        Ok(Self {
            jwt_details: JWTInfo::new()?,

            imps_details: ImpsInfo::new()?,

            upi_details: UpiInfo::new()?,

            reconciliation_details: ReconciliationInfo::new()?,

            gateway_timeout_secs: parse_or("GATEWAY_TIMEOUT_SECS", 30)?,

            require_verified_beneficiary: parse_or("REQUIRE_VERIFIED_BENEFICIARY", true)?,
        })
    }
}
