use crate::handlers::{
    adjust_balance::__path_adjust_balance,
    balance_request::__path_submit_balance_request,
    health::__path_health_check,
    invalidate_beneficiary::__path_invalidate_beneficiary,
    payout::__path_submit_payout,
    payout_status::__path_get_payout_status,
    resolve_balance_request::{__path_confirm_balance_request, __path_reject_balance_request},
    run_reconciliation::__path_run_reconciliation,
    transactions::__path_get_transactions,
    verify_beneficiary::__path_verify_beneficiary,
};
use payout_primitives::error::ApiErrorResponse;
use payout_primitives::models::dtos::*;
use payout_primitives::models::entities::{
    AdjustmentKind, BalanceRequestStatus, FailureKind, PayoutRail, TransactionStatus,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check, submit_payout, get_payout_status, get_transactions,
        verify_beneficiary, submit_balance_request, confirm_balance_request,
        reject_balance_request, adjust_balance, invalidate_beneficiary,
        run_reconciliation
    ),
    components(schemas(
        PayoutRequest, PayoutResponse, TransactionResponse, TransactionsResponse,
        BeneficiaryResponse, InvalidateBeneficiaryRequest, BalanceRequestDto,
        BalanceRequestDecisionDto, BalanceRequestResponse, AdjustmentRequest,
        AdjustmentResponse, ReconciliationSummary, HealthStatus, ApiErrorResponse,
        PayoutRail, TransactionStatus, FailureKind, BalanceRequestStatus, AdjustmentKind
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Payouts", description = "Payout submission and status"),
        (name = "Transactions", description = "Payout history"),
        (name = "Beneficiaries", description = "Beneficiary verification"),
        (name = "Balance", description = "Balance top-up requests"),
        (name = "Admin", description = "Back-office operations"),
        (name = "Health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
