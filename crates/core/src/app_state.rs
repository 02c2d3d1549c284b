use crate::clients::{GatewayRegistry, ImpsClient, UpiClient};
use crate::ledger::{LedgerStore, PgLedgerStore};
use eyre::Result;
pub use payout_primitives::models::app_state::AppConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub use crate::ledger::postgres::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerStore>,
    pub gateways: GatewayRegistry,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig) -> Result<Arc<Self>> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.gateway_timeout_secs))
            .build()?;

        let imps = ImpsClient::new(http.clone(), &config.imps_details)?;
        let upi = UpiClient::new(http, &config.upi_details)?;

        let gateways = GatewayRegistry::new()
            .with(Arc::new(imps))
            .with(Arc::new(upi));

        Ok(Self::from_parts(
            Arc::new(PgLedgerStore::new(db)),
            gateways,
            config,
        ))
    }

    /// Assembles state from already-built collaborators, e.g. an in-memory
    /// ledger and scripted gateways.
    pub fn from_parts(
        ledger: Arc<dyn LedgerStore>,
        gateways: GatewayRegistry,
        config: AppConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            ledger,
            gateways,
            config,
        })
    }
}
