use diesel::prelude::*;
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::balance_adjustment::{
    BalanceAdjustment, NewBalanceAdjustment,
};
use payout_primitives::schema::balance_adjustments;

pub struct BalanceAdjustmentRepository;

impl BalanceAdjustmentRepository {
    pub fn create(
        conn: &mut PgConnection,
        new_adjustment: NewBalanceAdjustment,
    ) -> Result<BalanceAdjustment, ApiError> {
        diesel::insert_into(balance_adjustments::table)
            .values(&new_adjustment)
            .get_result::<BalanceAdjustment>(conn)
            .map_err(ApiError::Database)
    }
}
