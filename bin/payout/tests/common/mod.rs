#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Duration;
use payout_core::clients::{
    GatewayClient, GatewayRegistry, GatewayResult, PayoutInstruction, StatusLookup,
};
use payout_core::ledger::{InMemoryLedgerStore, LedgerStore};
use payout_core::{AppState, SecurityConfig};
use payout_primitives::error::ApiError;
use payout_primitives::models::app_state::{
    AppConfig, ImpsInfo, JWTInfo, ReconciliationInfo, UpiInfo,
};
use payout_primitives::models::entities::{Destination, PayoutRail, User, VerificationStatus};
use secrecy::SecretString;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub mod fixtures;
pub mod pg;

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_details: JWTInfo {
            jwt_secret: SecretString::from("test_secret_key_minimum_32_characters_long_for_testing"),
            jwt_issuer: "payout".to_string(),
            jwt_audience: "payout_api".to_string(),
        },
        imps_details: ImpsInfo {
            imps_api_url: "http://localhost:9/imps".to_string(),
            imps_client_id: "imps_test_client".to_string(),
            imps_secret_key: SecretString::from("imps_test_secret"),
        },
        upi_details: UpiInfo {
            upi_api_url: "http://localhost:9/upi".to_string(),
            upi_client_id: "upi_test_client".to_string(),
            upi_client_secret: SecretString::from("upi_test_secret"),
        },
        reconciliation_details: ReconciliationInfo {
            enabled: false,
            interval_secs: 300,
            lock_timeout_secs: 600,
            min_age_secs: 120,
            window_hours: 72,
            batch_size: 100,
            max_attempts: 3,
            backoff_ms: 1,
            instance_id: "test-instance".to_string(),
        },
        gateway_timeout_secs: 2,
        require_verified_beneficiary: true,
    }
}

/// Gateway fake that replays queued results, then falls back to a fixed one.
pub struct ScriptedGateway {
    rail: PayoutRail,
    submit_results: Mutex<VecDeque<GatewayResult>>,
    submit_fallback: GatewayResult,
    status_results: Mutex<VecDeque<GatewayResult>>,
    status_fallback: GatewayResult,
    registered_name: Option<String>,
    delay: Option<std::time::Duration>,
    drain: Option<(InMemoryLedgerStore, Uuid)>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(rail: PayoutRail) -> Self {
        Self {
            rail,
            submit_results: Mutex::new(VecDeque::new()),
            submit_fallback: success("GW123"),
            status_results: Mutex::new(VecDeque::new()),
            status_fallback: GatewayResult::Pending {
                gateway_txn_ref: None,
            },
            registered_name: None,
            delay: None,
            drain: None,
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn submitting(mut self, result: GatewayResult) -> Self {
        self.submit_fallback = result;
        self
    }

    pub fn then_status(self, result: GatewayResult) -> Self {
        self.status_results
            .lock()
            .expect("status queue poisoned")
            .push_back(result);
        self
    }

    pub fn status(mut self, result: GatewayResult) -> Self {
        self.status_fallback = result;
        self
    }

    pub fn registered_name(mut self, name: &str) -> Self {
        self.registered_name = Some(name.to_string());
        self
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Wipes `user_id`'s balance and holds while the payout is "in flight".
    pub fn draining(mut self, store: InMemoryLedgerStore, user_id: Uuid) -> Self {
        self.drain = Some((store, user_id));
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Highest number of status checks observed running at the same time.
    pub fn max_concurrent_status_checks(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayClient for ScriptedGateway {
    fn rail(&self) -> PayoutRail {
        self.rail
    }

    async fn submit_payout(&self, _instruction: &PayoutInstruction<'_>) -> GatewayResult {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((store, user_id)) = &self.drain {
            if let Some(user) = store.user(*user_id).await {
                store
                    .insert_user(User {
                        balance: 0,
                        reserved: 0,
                        ..user
                    })
                    .await;
            }
        }

        self.submit_results
            .lock()
            .expect("submit queue poisoned")
            .pop_front()
            .unwrap_or_else(|| self.submit_fallback.clone())
    }

    async fn check_status(&self, _lookup: &StatusLookup<'_>) -> GatewayResult {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.status_results
            .lock()
            .expect("status queue poisoned")
            .pop_front()
            .unwrap_or_else(|| self.status_fallback.clone())
    }

    async fn resolve_account(&self, _destination: &Destination) -> Result<String, ApiError> {
        self.registered_name
            .clone()
            .ok_or_else(|| ApiError::GatewayRejected {
                code: "NOT_FOUND".into(),
                message: "Account not found".into(),
            })
    }
}

pub fn success(reference: &str) -> GatewayResult {
    GatewayResult::Success {
        gateway_txn_ref: Some(reference.to_string()),
    }
}

pub fn pending(reference: &str) -> GatewayResult {
    GatewayResult::Pending {
        gateway_txn_ref: Some(reference.to_string()),
    }
}

pub fn failed(code: &str, message: &str) -> GatewayResult {
    GatewayResult::Failed {
        reason_code: code.to_string(),
        message: message.to_string(),
    }
}

pub fn transport(cause: &str) -> GatewayResult {
    GatewayResult::transport(cause)
}

pub struct TestContext {
    pub state: Arc<AppState>,
    pub store: InMemoryLedgerStore,
    pub imps: Arc<ScriptedGateway>,
    pub upi: Arc<ScriptedGateway>,
}

/// App state over an in-memory ledger seeded with the default charge band.
pub async fn build_state(imps: ScriptedGateway, upi: ScriptedGateway) -> TestContext {
    build_state_with(InMemoryLedgerStore::new(), imps, upi, test_config()).await
}

pub async fn build_state_with(
    store: InMemoryLedgerStore,
    imps: ScriptedGateway,
    upi: ScriptedGateway,
    config: AppConfig,
) -> TestContext {
    store.set_charge_rules(fixtures::default_charge_rules()).await;

    let imps = Arc::new(imps);
    let upi = Arc::new(upi);

    let gateways = GatewayRegistry::new()
        .with(imps.clone() as Arc<dyn GatewayClient>)
        .with(upi.clone() as Arc<dyn GatewayClient>);

    let state = AppState::from_parts(
        Arc::new(store.clone()) as Arc<dyn LedgerStore>,
        gateways,
        config,
    );

    TestContext {
        state,
        store,
        imps,
        upi,
    }
}

pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    TestServer::new(payout_api::create_router(state)).expect("test server")
}

pub fn token_for(state: &AppState, user_id: Uuid, user_type: VerificationStatus) -> String {
    SecurityConfig::create_token(
        &state.config.jwt_details,
        user_id,
        user_type,
        Duration::minutes(30),
    )
    .expect("token")
}
