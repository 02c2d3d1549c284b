use chrono::Utc;
use diesel::prelude::*;
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::balance_request::{BalanceRequest, NewBalanceRequest};
use payout_primitives::models::entities::enum_types::BalanceRequestStatus;
use payout_primitives::schema::balance_requests;
use uuid::Uuid;

pub struct BalanceRequestRepository;

impl BalanceRequestRepository {
    /// `None` when the UTR was already claimed by another request.
    pub fn create_if_absent(
        conn: &mut PgConnection,
        new_request: &NewBalanceRequest,
    ) -> Result<Option<BalanceRequest>, ApiError> {
        diesel::insert_into(balance_requests::table)
            .values(new_request)
            .on_conflict(balance_requests::utr)
            .do_nothing()
            .get_result::<BalanceRequest>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_id_for_update(
        conn: &mut PgConnection,
        request_id: Uuid,
    ) -> Result<Option<BalanceRequest>, ApiError> {
        balance_requests::table
            .find(request_id)
            .for_update()
            .first::<BalanceRequest>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn resolve(
        conn: &mut PgConnection,
        request_id: Uuid,
        status: BalanceRequestStatus,
        admin_id: Uuid,
        remarks: Option<String>,
        snapshot: Option<(i64, i64)>,
    ) -> Result<BalanceRequest, ApiError> {
        diesel::update(
            balance_requests::table
                .filter(balance_requests::id.eq(request_id))
                .filter(balance_requests::status.eq(BalanceRequestStatus::New)),
        )
        .set((
            balance_requests::status.eq(status),
            balance_requests::balance_before.eq(snapshot.map(|(before, _)| before)),
            balance_requests::balance_after.eq(snapshot.map(|(_, after)| after)),
            balance_requests::remarks.eq(remarks),
            balance_requests::resolved_by.eq(Some(admin_id)),
            balance_requests::resolved_at.eq(Some(Utc::now())),
        ))
        .get_result::<BalanceRequest>(conn)
        .optional()
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::InvalidRequest("Balance request is no longer NEW".into()))
    }
}
