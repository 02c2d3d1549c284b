use chrono::{DateTime, Utc};
use diesel::prelude::*;
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::enum_types::TransactionStatus;
use payout_primitives::models::entities::transaction::{NewTransaction, Transaction};
use payout_primitives::schema::transactions;
use uuid::Uuid;

/// Failure code stamped on a PENDING row whose debit is owed.
pub const UNSETTLED_DEBIT_CODE: &str = "DEBIT_FAILED";
pub const UNSETTLED_DEBIT_MESSAGE: &str =
    "Gateway accepted the payout but the debit could not be applied";

pub struct TransactionRepository;

impl TransactionRepository {
    /// Inserts unless the idempotency key is taken. `None` means another
    /// request already owns the key.
    pub fn insert_if_absent(
        conn: &mut PgConnection,
        new_tx: &NewTransaction,
    ) -> Result<Option<Transaction>, ApiError> {
        diesel::insert_into(transactions::table)
            .values(new_tx)
            .on_conflict(transactions::transaction_id)
            .do_nothing()
            .get_result::<Transaction>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_key(conn: &mut PgConnection, key: &str) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::transaction_id.eq(key))
            .first::<Transaction>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .find(id)
            .for_update()
            .first::<Transaction>(conn)
            .optional()
            .map_err(ApiError::Database)
    }

    pub fn recent_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::user_id.eq(user_id))
            .order(transactions::created_at.desc())
            .limit(limit)
            .load::<Transaction>(conn)
            .map_err(ApiError::Database)
    }

    pub fn pending_between(
        conn: &mut PgConnection,
        created_after: DateTime<Utc>,
        created_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::status.eq(TransactionStatus::Pending))
            .filter(transactions::created_at.gt(created_after))
            .filter(transactions::created_at.lt(created_before))
            .order(transactions::created_at.asc())
            .limit(limit)
            .load::<Transaction>(conn)
            .map_err(ApiError::Database)
    }

    /// Conditional PENDING -> COMPLETED. `None` when the row already left PENDING.
    pub fn mark_completed(
        conn: &mut PgConnection,
        id: Uuid,
        reference_no: Option<String>,
    ) -> Result<Option<Transaction>, ApiError> {
        let now = Utc::now();

        diesel::update(
            transactions::table
                .filter(transactions::id.eq(id))
                .filter(transactions::status.eq(TransactionStatus::Pending)),
        )
        .set((
            transactions::status.eq(TransactionStatus::Completed),
            transactions::reference_no.eq(reference_no),
            transactions::balance_applied.eq(true),
            transactions::failure_code.eq(None::<String>),
            transactions::failure_message.eq(None::<String>),
            transactions::settled_at.eq(Some(now)),
            transactions::updated_at.eq(now),
        ))
        .get_result::<Transaction>(conn)
        .optional()
        .map_err(ApiError::Database)
    }

    /// Conditional PENDING -> FAILED after a definitive gateway decline.
    pub fn mark_failed(
        conn: &mut PgConnection,
        id: Uuid,
        code: &str,
        message: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        use payout_primitives::models::entities::enum_types::FailureKind;

        let now = Utc::now();

        diesel::update(
            transactions::table
                .filter(transactions::id.eq(id))
                .filter(transactions::status.eq(TransactionStatus::Pending)),
        )
        .set((
            transactions::status.eq(TransactionStatus::Failed),
            transactions::failure_kind.eq(Some(FailureKind::GatewayRejected)),
            transactions::failure_code.eq(Some(code)),
            transactions::failure_message.eq(Some(message)),
            transactions::settled_at.eq(Some(now)),
            transactions::updated_at.eq(now),
        ))
        .get_result::<Transaction>(conn)
        .optional()
        .map_err(ApiError::Database)
    }

    /// Puts a gateway-accepted payout whose debit could not be applied back
    /// to PENDING, keeping its key so retries replay instead of resubmitting.
    pub fn mark_unsettled(conn: &mut PgConnection, id: Uuid) -> Result<Transaction, ApiError> {
        diesel::update(transactions::table.filter(transactions::id.eq(id)))
            .set((
                transactions::status.eq(TransactionStatus::Pending),
                transactions::balance_applied.eq(false),
                transactions::failure_code.eq(Some(UNSETTLED_DEBIT_CODE)),
                transactions::failure_message.eq(Some(UNSETTLED_DEBIT_MESSAGE)),
                transactions::settled_at.eq(None::<DateTime<Utc>>),
                transactions::updated_at.eq(Utc::now()),
            ))
            .get_result::<Transaction>(conn)
            .map_err(ApiError::Database)
    }
}
