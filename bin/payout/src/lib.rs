mod observability;

pub mod utility;

pub use payout_primitives::error::ApiError;

use crate::utility::db_pool::{create_db_pool, run_migrations};
use crate::utility::logging::setup_logging;
use crate::utility::scheduler::spawn_reconciliation_job;
use crate::utility::server::serve;
use crate::utility::tasks::{build_router, initialize_system, load_env};
use eyre::Report;
use payout_core::AppState;
use payout_primitives::models::app_state::AppConfig;
use tracing::info;

pub async fn run() -> Result<(), Report> {
    // 1. load environment variables
    load_env();

    // 2. initialize logging first (so we can log everything else)
    setup_logging();

    info!("Starting payout service...");

    // 3. load configuration
    let config = AppConfig::from_env()?;

    // 4. create database connection pool and bring the schema up to date
    let pool = create_db_pool()?;
    run_migrations(&pool)?;

    // 5. build application state
    let state = AppState::new(pool, config)?;

    // 6. refuse to serve on a broken charge rule set
    initialize_system(&state).await?;

    // 7. start the reconciliation job
    let reconciliation = spawn_reconciliation_job(state.clone());

    // 8. initialize metrics
    let (metric_layer, metric_handle) = observability::metrics::setup_metrics();

    // 9. build axum router
    let app = build_router(state.clone(), metric_layer, metric_handle)?;

    // 10. start HTTP server
    serve(app).await?;

    if let Some(handle) = reconciliation {
        handle.abort();
    }

    info!("Payout service shut down gracefully");
    Ok(())
}
