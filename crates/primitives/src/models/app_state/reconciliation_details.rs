use eyre::Report;
use std::env;
use std::str::FromStr;
use uuid::Uuid;

/// Tuning for the pending-transaction reconciliation job.
#[derive(Debug, Clone)]
pub struct ReconciliationInfo {
    pub enabled: bool,
    pub interval_secs: u64,
    /// A held lock older than this is considered abandoned by a crashed holder.
    pub lock_timeout_secs: i64,
    /// Candidates younger than this may still be in flight in the orchestrator.
    pub min_age_secs: i64,
    pub window_hours: i64,
    pub batch_size: i64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
    /// Identifies this process as a lock holder.
    pub instance_id: String,
}

impl ReconciliationInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            enabled: parse_or("RECON_ENABLED", true)?,
            interval_secs: parse_or("RECON_INTERVAL_SECS", 300)?,
            lock_timeout_secs: parse_or("RECON_LOCK_TIMEOUT_SECS", 600)?,
            min_age_secs: parse_or("RECON_MIN_AGE_SECS", 120)?,
            window_hours: parse_or("RECON_WINDOW_HOURS", 72)?,
            batch_size: parse_or("RECON_BATCH_SIZE", 100)?,
            max_attempts: parse_or("RECON_MAX_ATTEMPTS", 3)?,
            backoff_ms: parse_or("RECON_BACKOFF_MS", 500)?,
            instance_id: env::var("INSTANCE_ID").unwrap_or_else(|_| Uuid::new_v4().to_string()),
        })
    }

    pub fn lock_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.lock_timeout_secs)
    }

    pub fn min_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.min_age_secs)
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.window_hours)
    }
}

pub(crate) fn parse_or<T>(key: &str, default: T) -> Result<T, Report>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre::eyre!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
