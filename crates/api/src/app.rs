use crate::config::swagger_config::ApiDoc;
use crate::handlers::{
    adjust_balance::adjust_balance,
    balance_request::submit_balance_request,
    health::health_check,
    invalidate_beneficiary::invalidate_beneficiary,
    payout::submit_payout,
    payout_status::get_payout_status,
    resolve_balance_request::{confirm_balance_request, reject_balance_request},
    run_reconciliation::run_reconciliation,
    transactions::get_transactions,
    verify_beneficiary::verify_beneficiary,
};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use payout_core::{AppState, SecurityConfig};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // public routes (no authentication)
    let public_router = create_public_routers();

    // caller routes (require JWT authentication)
    let protected_router = create_secured_routers(&state);

    // admin routes (JWT + ADMIN user type)
    let admin_router = create_admin_routers(&state);

    Router::new()
        .merge(public_router)
        .merge(protected_router)
        .merge(admin_router)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

fn create_secured_routers(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/payouts", post(submit_payout))
        .route("/api/payouts/{transaction_id}", get(get_payout_status))
        .route("/api/transactions", get(get_transactions))
        .route(
            "/api/beneficiaries/{beneficiary_id}/verify",
            post(verify_beneficiary),
        )
        .route("/api/balance_requests", post(submit_balance_request))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            SecurityConfig::auth_middleware,
        ))
}

fn create_admin_routers(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    // layers run outermost-last: authenticate, then check the role
    Router::new()
        .route(
            "/api/admin/balance_requests/{request_id}/confirm",
            post(confirm_balance_request),
        )
        .route(
            "/api/admin/balance_requests/{request_id}/reject",
            post(reject_balance_request),
        )
        .route(
            "/api/admin/users/{user_id}/adjustments",
            post(adjust_balance),
        )
        .route(
            "/api/admin/beneficiaries/{beneficiary_id}/invalidate",
            post(invalidate_beneficiary),
        )
        .route("/api/admin/reconciliation/run", post(run_reconciliation))
        .layer(middleware::from_fn(SecurityConfig::admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            SecurityConfig::auth_middleware,
        ))
}

fn create_public_routers() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}
