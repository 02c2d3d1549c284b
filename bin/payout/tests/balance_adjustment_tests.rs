mod common;

use common::fixtures::{admin_user, test_user};
use common::{build_state, ScriptedGateway};
use payout_core::services::balance_adjustment_service::BalanceAdjustmentService;
use payout_primitives::error::ApiError;
use payout_primitives::models::dtos::balance_dto::{AdjustmentRequest, BalanceRequestDto};
use payout_primitives::models::entities::{AdjustmentKind, BalanceRequestStatus, PayoutRail};
use rust_decimal_macros::dec;

async fn context() -> common::TestContext {
    build_state(
        ScriptedGateway::new(PayoutRail::Imps),
        ScriptedGateway::new(PayoutRail::Upi),
    )
    .await
}

#[tokio::test]
async fn confirmed_request_credits_once_with_snapshot() {
    let ctx = context().await;
    let user = test_user(10_000);
    let admin = admin_user();
    ctx.store.insert_user(user.clone()).await;
    ctx.store.insert_user(admin.clone()).await;

    let request = BalanceAdjustmentService::submit_balance_request(
        &ctx.state,
        user.id,
        BalanceRequestDto {
            amount: dec!(2500.00),
            utr: "UTR402612345678".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(request.status, BalanceRequestStatus::New);
    assert_eq!(ctx.store.user(user.id).await.unwrap().balance, 10_000);

    let confirmed = BalanceAdjustmentService::confirm_balance_request(
        &ctx.state,
        admin.id,
        request.id,
        Some("matched statement".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(confirmed.status, BalanceRequestStatus::Confirmed);
    assert_eq!(confirmed.balance_before, Some(dec!(100.00)));
    assert_eq!(confirmed.balance_after, Some(dec!(2600.00)));
    assert_eq!(ctx.store.user(user.id).await.unwrap().balance, 260_000);

    // a second decision on the same request is refused
    let err = BalanceAdjustmentService::confirm_balance_request(&ctx.state, admin.id, request.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert_eq!(ctx.store.user(user.id).await.unwrap().balance, 260_000);
}

#[tokio::test]
async fn rejected_request_changes_nothing_and_utr_is_unique() {
    let ctx = context().await;
    let user = test_user(10_000);
    let admin = admin_user();
    ctx.store.insert_user(user.clone()).await;
    ctx.store.insert_user(admin.clone()).await;

    let dto = BalanceRequestDto {
        amount: dec!(50.00),
        utr: "UTR000000000042".to_string(),
    };

    let request = BalanceAdjustmentService::submit_balance_request(&ctx.state, user.id, dto.clone())
        .await
        .unwrap();

    let duplicate = BalanceAdjustmentService::submit_balance_request(&ctx.state, user.id, dto)
        .await
        .unwrap_err();
    assert!(matches!(duplicate, ApiError::InvalidRequest(_)));

    let rejected = BalanceAdjustmentService::reject_balance_request(&ctx.state, admin.id, request.id, None)
        .await
        .unwrap();
    assert_eq!(rejected.status, BalanceRequestStatus::Rejected);
    assert!(rejected.balance_after.is_none());
    assert_eq!(ctx.store.user(user.id).await.unwrap().balance, 10_000);
}

#[tokio::test]
async fn deduction_never_goes_negative() {
    let ctx = context().await;
    let user = test_user(10_000);
    let admin = admin_user();
    ctx.store.insert_user(user.clone()).await;
    ctx.store.insert_user(admin.clone()).await;

    let added = BalanceAdjustmentService::adjust_balance(
        &ctx.state,
        admin.id,
        user.id,
        AdjustmentRequest {
            kind: AdjustmentKind::Addition,
            amount: dec!(150.00),
            reason: "Goodwill credit".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(added.balance_before, dec!(100.00));
    assert_eq!(added.balance_after, dec!(250.00));

    let err = BalanceAdjustmentService::adjust_balance(
        &ctx.state,
        admin.id,
        user.id,
        AdjustmentRequest {
            kind: AdjustmentKind::Deduction,
            amount: dec!(250.01),
            reason: "Chargeback".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InsufficientBalance { .. }));

    let deducted = BalanceAdjustmentService::adjust_balance(
        &ctx.state,
        admin.id,
        user.id,
        AdjustmentRequest {
            kind: AdjustmentKind::Deduction,
            amount: dec!(250.00),
            reason: "Chargeback".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(deducted.balance_after, dec!(0.00));
    assert_eq!(ctx.store.user(user.id).await.unwrap().balance, 0);

    assert_eq!(ctx.store.adjustments().await.len(), 2);
    assert_eq!(
        ctx.store
            .audit_events()
            .await
            .iter()
            .filter(|e| e.event_type == "balance.adjusted")
            .count(),
        2
    );
}

#[tokio::test]
async fn non_positive_amounts_are_invalid() {
    let ctx = context().await;
    let user = test_user(10_000);
    ctx.store.insert_user(user.clone()).await;

    let err = BalanceAdjustmentService::submit_balance_request(
        &ctx.state,
        user.id,
        BalanceRequestDto {
            amount: dec!(0),
            utr: "UTR999999999".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));

    let err = BalanceAdjustmentService::adjust_balance(
        &ctx.state,
        user.id,
        user.id,
        AdjustmentRequest {
            kind: AdjustmentKind::Addition,
            amount: dec!(-5.00),
            reason: "Typo".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}
