use chrono::Utc;
use diesel::prelude::*;
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::beneficiary::{Beneficiary, NewBeneficiary};
use payout_primitives::schema::beneficiaries;
use uuid::Uuid;

pub struct BeneficiaryRepository;

impl BeneficiaryRepository {
    pub fn find_by_id(
        conn: &mut PgConnection,
        beneficiary_id: Uuid,
    ) -> Result<Option<Beneficiary>, ApiError> {
        beneficiaries::table
            .find(beneficiary_id)
            .first::<Beneficiary>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn create(conn: &mut PgConnection, new: NewBeneficiary) -> Result<Beneficiary, ApiError> {
        diesel::insert_into(beneficiaries::table)
            .values(&new)
            .get_result::<Beneficiary>(conn)
            .map_err(ApiError::Database)
    }

    pub fn set_verification(
        conn: &mut PgConnection,
        beneficiary_id: Uuid,
        verified: bool,
        verified_name: Option<String>,
    ) -> Result<Beneficiary, ApiError> {
        diesel::update(beneficiaries::table.find(beneficiary_id))
            .set((
                beneficiaries::is_verified.eq(verified),
                beneficiaries::verified_name.eq(verified_name),
                beneficiaries::updated_at.eq(Utc::now()),
            ))
            .get_result::<Beneficiary>(conn)
            .optional()
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::NotFound("Beneficiary not found".into()))
    }
}
