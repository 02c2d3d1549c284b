use crate::models::entities::beneficiary::Beneficiary;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BeneficiaryResponse {
    pub id: Uuid,
    pub name: String,
    pub account_number: Option<String>,
    pub ifsc: Option<String>,
    pub vpa: Option<String>,
    pub is_verified: bool,
    pub verified_name: Option<String>,
}

impl From<Beneficiary> for BeneficiaryResponse {
    fn from(b: Beneficiary) -> Self {
        Self {
            id: b.id,
            name: b.name,
            account_number: b.account_number,
            ifsc: b.ifsc,
            vpa: b.vpa,
            is_verified: b.is_verified,
            verified_name: b.verified_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct InvalidateBeneficiaryRequest {
    #[validate(length(min = 3, max = 255))]
    pub reason: String,
}
