use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Text, Timestamptz};
use payout_primitives::error::ApiError;
use payout_primitives::models::entities::cron_lock::CronLock;
use payout_primitives::schema::cron_locks;

pub struct CronLockRepository;

impl CronLockRepository {
    /// Single-statement acquire: inserts the row, or takes it over when it is
    /// free or its holder went stale. One affected row means we hold the lock.
    pub fn try_acquire(
        conn: &mut PgConnection,
        job: &str,
        holder: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let affected = diesel::sql_query(
            "INSERT INTO cron_locks (job_name, is_locked, locked_at, locked_by) \
             VALUES ($1, TRUE, $2, $3) \
             ON CONFLICT (job_name) DO UPDATE \
             SET is_locked = TRUE, locked_at = EXCLUDED.locked_at, locked_by = EXCLUDED.locked_by \
             WHERE cron_locks.is_locked = FALSE \
                OR cron_locks.locked_at IS NULL \
                OR cron_locks.locked_at < $4",
        )
        .bind::<Text, _>(job)
        .bind::<Timestamptz, _>(now)
        .bind::<Text, _>(holder)
        .bind::<Timestamptz, _>(stale_before)
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(affected == 1)
    }

    /// Releases only when `holder` still owns the row, so a stale holder that
    /// wakes up late cannot free a lock someone else took over.
    pub fn release(conn: &mut PgConnection, job: &str, holder: &str) -> Result<bool, ApiError> {
        let affected = diesel::update(
            cron_locks::table
                .filter(cron_locks::job_name.eq(job))
                .filter(cron_locks::locked_by.eq(holder)),
        )
        .set(cron_locks::is_locked.eq(false))
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(affected == 1)
    }

    /// Pushes `locked_at` forward while `holder` still owns the lock.
    pub fn renew(
        conn: &mut PgConnection,
        job: &str,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let affected = diesel::update(
            cron_locks::table
                .filter(cron_locks::job_name.eq(job))
                .filter(cron_locks::locked_by.eq(holder))
                .filter(cron_locks::is_locked.eq(true)),
        )
        .set(cron_locks::locked_at.eq(Some(now)))
        .execute(conn)
        .map_err(ApiError::Database)?;

        Ok(affected == 1)
    }

    pub fn find(conn: &mut PgConnection, job: &str) -> Result<Option<CronLock>, ApiError> {
        cron_locks::table
            .find(job)
            .first::<CronLock>(conn)
            .optional()
            .map_err(ApiError::Database)
    }
}
