use payout_core::services::reconciliation_service::ReconciliationService;
use payout_core::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Drives `run_pass` every `RECON_INTERVAL_SECS`. Every instance may run this;
/// the cron lock keeps passes exclusive.
pub fn spawn_reconciliation_job(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let cfg = &state.config.reconciliation_details;

    if !cfg.enabled {
        info!("Reconciliation job disabled");
        return None;
    }

    let period = Duration::from_secs(cfg.interval_secs.max(1));
    info!(
        interval_secs = period.as_secs(),
        instance_id = %cfg.instance_id,
        "Starting reconciliation job"
    );

    Some(tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // skip the immediate first tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match ReconciliationService::run_pass(&state).await {
                Ok(summary) if summary.skipped => {}
                Ok(summary) => info!(
                    processed = summary.processed,
                    errored = summary.errored,
                    "Scheduled reconciliation pass done"
                ),
                Err(e) => error!(error = %e, "Scheduled reconciliation pass failed"),
            }
        }
    }))
}
