use diesel::prelude::*;
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::charge_rule::{ChargeRule, NewChargeRule};
use payout_primitives::schema::charge_rules;

pub struct ChargeRuleRepository;

impl ChargeRuleRepository {
    pub fn find_active(conn: &mut PgConnection) -> Result<Vec<ChargeRule>, ApiError> {
        charge_rules::table
            .filter(charge_rules::is_active.eq(true))
            .order(charge_rules::min_amount.asc())
            .load::<ChargeRule>(conn)
            .map_err(ApiError::Database)
    }

    /// Swaps the active rule set in one transaction so readers never see a mix.
    pub fn replace_active(
        conn: &mut PgConnection,
        rules: Vec<NewChargeRule>,
    ) -> Result<Vec<ChargeRule>, ApiError> {
        conn.transaction::<_, ApiError, _>(|conn| {
            diesel::update(charge_rules::table.filter(charge_rules::is_active.eq(true)))
                .set(charge_rules::is_active.eq(false))
                .execute(conn)?;

            diesel::insert_into(charge_rules::table)
                .values(&rules)
                .get_results::<ChargeRule>(conn)
                .map_err(ApiError::Database)
        })
    }
}
