use axum::routing::get;
use axum::Router;
use axum_prometheus::{metrics_exporter_prometheus::PrometheusHandle, PrometheusMetricLayer};
use eyre::{eyre, Report};
use http::HeaderValue;
use payout_core::services::charge_service::ChargeResolver;
use payout_core::AppState;
use std::env;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub fn build_cors() -> Result<CorsLayer, Report> {
    let origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into());

    let allowed_origins = origins
        .split(',')
        .map(|s| s.trim().parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| eyre!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(allowed_origins))
}

pub fn load_env() {
    if dotenvy::dotenv().is_ok() {
        info!("Loaded .env file");
    } else {
        info!("No .env file found, using system environment");
    }
}

pub fn build_router(
    state: Arc<AppState>,
    metric_layer: PrometheusMetricLayer<'static>,
    metric_handle: PrometheusHandle,
) -> Result<Router, Report> {
    let cors = build_cors()?;

    Ok(payout_api::create_router(state)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(metric_layer)
        .layer(cors))
}

/// Startup checks that must pass before the server accepts traffic.
pub async fn initialize_system(state: &Arc<AppState>) -> Result<(), Report> {
    state
        .ledger
        .ping()
        .await
        .map_err(|e| eyre!("Ledger unreachable: {}", e))?;

    let rules = state.ledger.active_charge_rules().await?;
    let resolver = ChargeResolver::new(rules);
    resolver
        .validate()
        .map_err(|e| eyre!("Refusing to start: {}", e))?;

    let (min, max) = resolver.envelope().unwrap_or_default();
    info!(
        bands = resolver.rules().len(),
        min_amount = min,
        max_amount = max,
        "Charge rules validated"
    );

    Ok(())
}
