use chrono::{DateTime, Duration, Utc};
use diesel::{Identifiable, Queryable};
use serde::Serialize;

/// Cross-instance mutual exclusion row for a periodic job.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Serialize)]
#[diesel(table_name = crate::schema::cron_locks)]
#[diesel(primary_key(job_name))]
pub struct CronLock {
    pub job_name: String,
    pub is_locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
}

impl CronLock {
    /// A lock blocks new holders only while it is held and younger than `timeout`.
    pub fn blocks(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        match (self.is_locked, self.locked_at) {
            (true, Some(locked_at)) => now - locked_at < timeout,
            _ => false,
        }
    }
}
